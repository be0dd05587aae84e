//! The event vocabulary: all inter-actor communication.
//!
//! RULE: Actors communicate ONLY through events and position reads.
//! An actor may never call another actor's functions directly.
//! An actor may never mutate another actor's transform.
//!
//! Events carry no payload beyond their name.

use crate::types::{Frame, RunId};
use serde::{Deserialize, Serialize};

/// Every event that can cross the bus.
/// The vocabulary is closed and variants carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimEvent {
    /// Re-initialise every actor. Published once at startup.
    Reset,
    /// A fish bit the hook and starts to flee.
    FishFight,
    /// The fisherman has started reeling in.
    FishermanFight,
    /// The fish reached the fisherman.
    FishCaught,
}

impl SimEvent {
    pub const ALL: [SimEvent; 4] = [
        SimEvent::Reset,
        SimEvent::FishFight,
        SimEvent::FishermanFight,
        SimEvent::FishCaught,
    ];

    /// Stable string name, used for the event_type column in event_log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reset          => "reset",
            Self::FishFight      => "fish_fight",
            Self::FishermanFight => "fisherman_fight",
            Self::FishCaught     => "fish_caught",
        }
    }
}

/// One published event as recorded by the engine and persisted to SQLite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub frame:      Frame,
    pub elapsed_ms: u64,
    /// Actor (or "engine"/"external") that published the event.
    pub source:     String,
    pub event_type: String,
    /// Publish depth: 0 for a root publish, +1 per nested publish.
    pub depth:      u32,
    pub payload:    String, // JSON-serialized SimEvent
}
