//! Snapshot serialization: scene state to JSON.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL frames and on demand for
//! the UI feed. It captures what an overlay needs to draw: each actor's
//! state and position.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    clock::SimClock,
    types::{Frame, RunId},
};

pub const SNAPSHOT_INTERVAL: Frame = 300; // 5 s at 60 fps

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub actor:    String,
    pub state:    String,
    pub position: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub run_id:         RunId,
    pub frame:          Frame,
    pub clock:          SimClock,
    pub pending_timers: usize,
    pub actors:         Vec<ActorSnapshot>,
}

impl SceneSnapshot {
    pub fn actor(&self, name: &str) -> Option<&ActorSnapshot> {
        self.actors.iter().find(|a| a.actor == name)
    }
}
