//! Actor trait and the per-call context the engine hands to actors.
//!
//! RULE: Every scene actor implements Actor.
//! The engine calls `update()` on each registered actor in
//! registration order, every frame, and `receive()` for every
//! event the actor subscribed to during `setup()`.
//! Execution order is fixed and documented in engine.rs.

use std::any::Any;
use std::collections::HashMap;
use std::time::Duration;

use glam::Vec3;

use crate::{
    assets::AssetSource,
    bus::EventBus,
    error::SimResult,
    event::SimEvent,
    rng::ActorRng,
    scheduler::{FiredTimer, Scheduler, TimerAction, TimerHandle},
    types::{ActorSlot, Frame},
};

/// The contract every actor must fulfill.
///
/// Every method that can publish returns the events it publishes.
/// The engine delivers them before moving on (see bus.rs).
pub trait Actor: Send {
    fn slot(&self) -> ActorSlot;

    /// Name of the current state, for logs and snapshots.
    fn state_name(&self) -> &'static str;

    /// Current position. A copy, never a live reference.
    fn position(&self) -> Vec3;

    /// One-time registration of subscriptions and initial placement.
    /// Called after every actor is registered, before the first frame.
    fn setup(&mut self, setup: &mut Setup<'_>) -> SimResult<()>;

    /// Handle one event this actor subscribed to.
    fn receive(&mut self, event: SimEvent, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>>;

    /// Run the current state's per-frame routine.
    fn update(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>>;

    /// A timer this actor armed has come due.
    fn on_timer(&mut self, fired: FiredTimer, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        let _ = (fired, ctx);
        Ok(Vec::new())
    }

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}

/// Last known position of every actor, refreshed by the engine after
/// each actor call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Positions {
    table: HashMap<ActorSlot, Vec3>,
}

impl Positions {
    pub fn set(&mut self, slot: ActorSlot, position: Vec3) {
        self.table.insert(slot, position);
    }

    /// Position of `slot`, or the origin if it was never published.
    pub fn get(&self, slot: ActorSlot) -> Vec3 {
        self.table.get(&slot).copied().unwrap_or(Vec3::ZERO)
    }

    pub fn fisherman(&self) -> Vec3 { self.get(ActorSlot::Fisherman) }
    pub fn bobber(&self)    -> Vec3 { self.get(ActorSlot::Bobber) }
    pub fn fish(&self)      -> Vec3 { self.get(ActorSlot::Fish) }
    pub fn line(&self)      -> Vec3 { self.get(ActorSlot::Line) }
}

/// Everything an actor may touch while it runs: time, other actors'
/// positions, its own RNG stream, and the timer scheduler.
pub struct ActorContext<'a> {
    pub slot:      ActorSlot,
    pub frame:     Frame,
    pub now:       Duration,
    pub dt:        Duration,
    pub positions: &'a Positions,
    pub rng:       &'a mut ActorRng,
    scheduler:     &'a mut Scheduler,
}

impl<'a> ActorContext<'a> {
    pub fn new(
        slot: ActorSlot,
        frame: Frame,
        now: Duration,
        dt: Duration,
        positions: &'a Positions,
        rng: &'a mut ActorRng,
        scheduler: &'a mut Scheduler,
    ) -> Self {
        Self { slot, frame, now, dt, positions, rng, scheduler }
    }

    pub fn dt_secs(&self) -> f32 {
        self.dt.as_secs_f32()
    }

    /// Arm a timer owned by this actor.
    pub fn schedule_once(&mut self, delay: Duration, action: TimerAction) -> TimerHandle {
        self.scheduler.schedule_once(self.slot, action, self.now, self.frame, delay)
    }

    /// Arm a timer into `slot` unless one is already pending there.
    /// Returns true when a new timer was armed.
    pub fn schedule_if_absent(
        &mut self,
        slot: &mut Option<TimerHandle>,
        delay: Duration,
        action: TimerAction,
    ) -> bool {
        if slot.is_some() {
            return false;
        }
        *slot = Some(self.schedule_once(delay, action));
        true
    }

    pub fn cancel(&mut self, slot: &mut Option<TimerHandle>) {
        self.scheduler.cancel(slot);
    }
}

/// Setup-time access: subscribe to events and fetch assets.
pub struct Setup<'a> {
    pub slot:   ActorSlot,
    pub assets: &'a dyn AssetSource,
    bus:        &'a mut EventBus,
}

impl<'a> Setup<'a> {
    pub fn new(slot: ActorSlot, assets: &'a dyn AssetSource, bus: &'a mut EventBus) -> Self {
        Self { slot, assets, bus }
    }

    pub fn subscribe(&mut self, event: SimEvent) {
        self.bus.subscribe(event, self.slot);
    }
}
