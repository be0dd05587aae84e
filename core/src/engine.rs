//! The per-frame driver: the heart of the fishing scene.
//!
//! UPDATE ORDER (fixed):
//!   1. Fisherman
//!   2. Fishing line
//!   3. Bobber
//!   4. Fish
//!
//! FRAME STEPS:
//!   1. Advance the clock by one frame.
//!   2. Fire every timer that came due on this boundary, in due order.
//!   3. Call update() on each actor in registration order.
//!   4. Snapshot every SNAPSHOT_INTERVAL frames.
//!
//! RULES:
//!   - Events an actor returns are dispatched before the engine moves on
//!     to the next timer or actor (ordering rules in bus.rs).
//!   - All randomness flows through the RngBank.
//!   - Every published event is recorded in the event log.
//!   - An error from any actor aborts the rest of the frame.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::{
    actor::{Actor, ActorContext, Positions, Setup},
    assets::{AssetSource, ClipLibrary},
    bobber::Bobber,
    bus::{EventBus, MAX_PUBLISH_DEPTH},
    clock::SimClock,
    config::SimConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    fish::Fish,
    fisherman::Fisherman,
    line::FishingLine,
    rng::RngBank,
    scheduler::Scheduler,
    snapshot::{ActorSnapshot, SceneSnapshot, SNAPSHOT_INTERVAL},
    stats::{SessionStats, StatsTally},
    store::SimStore,
    types::{ActorSlot, Frame, RunId},
};

/// Publisher name recorded for events injected through `publish`.
pub const EXTERNAL_SOURCE: &str = "external";

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    pub store:    SimStore,
    seed:         u64,
    bus:          EventBus,
    scheduler:    Scheduler,
    positions:    Positions,
    actors:       Vec<Box<dyn Actor>>,
    event_log:    Vec<EventLogEntry>,
    published:    BTreeMap<SimEvent, usize>,
    tally:        StatsTally,
    started:      bool,
}

impl SimEngine {
    pub fn new(run_id: RunId, seed: u64, frame_dt: Duration, store: SimStore) -> Self {
        Self {
            clock:     SimClock::new(run_id.clone(), frame_dt),
            rng_bank:  RngBank::new(seed),
            store,
            seed,
            bus:       EventBus::new(),
            scheduler: Scheduler::new(),
            positions: Positions::default(),
            actors:    Vec::new(),
            event_log: Vec::new(),
            published: BTreeMap::new(),
            tally:     StatsTally::default(),
            started:   false,
            run_id,
        }
    }

    /// Build a fully wired scene with all actors registered and started.
    /// Call this instead of new() + manual register() calls.
    pub fn build(
        run_id: RunId,
        seed: u64,
        config: &SimConfig,
        assets: &dyn AssetSource,
        store: SimStore,
    ) -> SimResult<Self> {
        config.validate()?;
        let mut engine = SimEngine::new(run_id, seed, config.frame.frame_dt(), store);

        // Update order is fixed.
        engine.register(Box::new(Fisherman::new(config.fisherman.clone())))?;
        engine.register(Box::new(FishingLine::new(config.line.clone(), &config.fisherman)))?;
        engine.register(Box::new(Bobber::new(config.bobber.clone(), &config.fisherman)))?;
        engine.register(Box::new(Fish::new(config.fish.clone())))?;

        engine.start(assets)?;
        Ok(engine)
    }

    /// Default-tuned scene over an in-memory store with builtin clips.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::build_test_with(run_id, seed, &SimConfig::default())
    }

    pub fn build_test_with(run_id: RunId, seed: u64, config: &SimConfig) -> SimResult<Self> {
        let store = Self::test_store(&run_id, seed)?;
        Self::build(run_id, seed, config, &ClipLibrary::builtin(), store)
    }

    /// In-memory store, migrated, with the run row inserted.
    pub fn test_store(run_id: &str, seed: u64) -> SimResult<SimStore> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        store.insert_run(run_id, seed, "0.1.0-test")?;
        Ok(store)
    }

    /// Register an actor. Call in the documented update order, before start().
    pub fn register(&mut self, actor: Box<dyn Actor>) -> SimResult<()> {
        let slot = actor.slot();
        if self.started {
            return Err(anyhow::anyhow!("cannot register {} after start", slot.name()).into());
        }
        if self.actors.iter().any(|a| a.slot() == slot) {
            return Err(anyhow::anyhow!("actor slot {slot:?} registered twice").into());
        }
        self.actors.push(actor);
        Ok(())
    }

    /// Run every actor's setup in registration order, then publish Reset.
    /// Any setup failure aborts startup.
    pub fn start(&mut self, assets: &dyn AssetSource) -> SimResult<()> {
        if self.started {
            return Ok(());
        }
        for actor in &mut self.actors {
            let slot = actor.slot();
            let mut setup = Setup::new(slot, assets, &mut self.bus);
            actor.setup(&mut setup).inspect_err(|e| {
                log::error!("setup of {} failed: {e}", slot.name());
            })?;
            self.positions.set(slot, actor.position());
        }
        self.started = true;
        log::info!(
            "run {} started: seed={} actors={} subscriptions={}",
            self.run_id, self.seed, self.actors.len(), self.bus.subscriber_count()
        );
        self.dispatch(SimEvent::Reset, "engine", 0)
    }

    /// Advance one frame. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Frame> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let frame = self.clock.advance();
        let now = self.clock.elapsed;

        // Timers fire on the boundary, before any actor updates.
        while let Some(fired) = self.scheduler.pop_due(now, frame) {
            log::trace!("frame={frame} timer {:?} fired for {}", fired.action, fired.owner.name());
            let emitted = self.call_actor(fired.owner, |actor, ctx| actor.on_timer(fired, ctx))?;
            for event in emitted {
                self.dispatch(event, fired.owner.name(), 0)?;
            }
        }

        for index in 0..self.actors.len() {
            let slot = self.actors[index].slot();
            let emitted = self.call_actor(slot, |actor, ctx| actor.update(ctx))?;
            for event in emitted {
                self.dispatch(event, slot.name(), 0)?;
            }
        }

        if frame.is_multiple_of(SNAPSHOT_INTERVAL) {
            self.take_snapshot()?;
        }

        Ok(frame)
    }

    /// Run n frames in a loop. Used for testing and fast-forward.
    pub fn run_frames(&mut self, n: u64) -> SimResult<()> {
        self.clock.resume();
        let result = (0..n).try_for_each(|_| self.tick().map(|_| ()));
        self.clock.pause();
        result
    }

    /// Publish an event from outside the scene (UI, harness, tests).
    /// Returns once every subscriber, and everything they published, ran.
    pub fn publish(&mut self, event: SimEvent) -> SimResult<()> {
        self.dispatch(event, EXTERNAL_SOURCE, 0)
    }

    fn dispatch(&mut self, event: SimEvent, source: &str, depth: usize) -> SimResult<()> {
        if depth > MAX_PUBLISH_DEPTH {
            return Err(SimError::PublishDepthExceeded { event, depth });
        }
        self.record(event, source, depth)?;

        let subscribers = self.bus.subscribers(event).to_vec();
        for slot in subscribers {
            let emitted = self.call_actor(slot, |actor, ctx| actor.receive(event, ctx))?;
            for next in emitted {
                self.dispatch(next, slot.name(), depth + 1)?;
            }
        }
        Ok(())
    }

    fn call_actor<F>(&mut self, slot: ActorSlot, call: F) -> SimResult<Vec<SimEvent>>
    where
        F: FnOnce(&mut dyn Actor, &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>>,
    {
        let index = self.index_of(slot)?;
        let Self { actors, scheduler, rng_bank, positions, clock, .. } = self;
        let actor = actors[index].as_mut();

        let emitted = {
            let mut ctx = ActorContext::new(
                slot,
                clock.current_frame,
                clock.elapsed,
                clock.frame_dt,
                positions,
                rng_bank.for_actor(slot),
                scheduler,
            );
            call(&mut *actor, &mut ctx)?
        };

        positions.set(slot, actor.position());
        Ok(emitted)
    }

    fn record(&mut self, event: SimEvent, source: &str, depth: usize) -> SimResult<()> {
        let entry = EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            frame:      self.clock.current_frame,
            elapsed_ms: self.clock.elapsed_ms(),
            source:     source.to_string(),
            event_type: event.name().to_string(),
            depth:      depth as u32,
            payload:    serde_json::to_string(&event)?,
        };
        log::debug!(
            "frame={} publish {} from {source} (depth {depth})",
            entry.frame, entry.event_type
        );
        self.store.append_event(&entry)?;
        *self.published.entry(event).or_default() += 1;
        self.tally.record(event, entry.frame, entry.elapsed_ms);
        self.event_log.push(entry);
        Ok(())
    }

    fn index_of(&self, slot: ActorSlot) -> SimResult<usize> {
        self.actors
            .iter()
            .position(|a| a.slot() == slot)
            .ok_or_else(|| SimError::ActorNotFound { name: format!("{slot:?}") })
    }

    // ── Read access ────────────────────────────────────────────────

    /// Typed view of a registered actor. Tests and tooling only.
    pub fn actor<T: 'static>(&self, slot: ActorSlot) -> Option<&T> {
        self.actors
            .iter()
            .find(|a| a.slot() == slot)
            .and_then(|a| a.as_any().downcast_ref::<T>())
    }

    pub fn fish(&self) -> Option<&Fish> { self.actor(ActorSlot::Fish) }
    pub fn fisherman(&self) -> Option<&Fisherman> { self.actor(ActorSlot::Fisherman) }
    pub fn bobber(&self) -> Option<&Bobber> { self.actor(ActorSlot::Bobber) }
    pub fn line(&self) -> Option<&FishingLine> { self.actor(ActorSlot::Line) }

    pub fn positions(&self) -> &Positions { &self.positions }

    pub fn scheduler(&self) -> &Scheduler { &self.scheduler }

    pub fn pending_timers(&self, owner: ActorSlot) -> usize {
        self.scheduler.pending_for(owner)
    }

    pub fn subscribers(&self, event: SimEvent) -> &[ActorSlot] {
        self.bus.subscribers(event)
    }

    /// Every event published this run, in publish order.
    pub fn event_log(&self) -> &[EventLogEntry] { &self.event_log }

    pub fn count_published(&self, event: SimEvent) -> usize {
        self.published.get(&event).copied().unwrap_or(0)
    }

    pub fn stats(&self) -> SessionStats {
        self.tally.stats().clone()
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            run_id:         self.run_id.clone(),
            frame:          self.clock.current_frame,
            clock:          self.clock.clone(),
            pending_timers: self.scheduler.pending_count(),
            actors:         self.actors.iter().map(|a| ActorSnapshot {
                actor:    a.slot().name().to_string(),
                state:    a.state_name().to_string(),
                position: a.position(),
            }).collect(),
        }
    }

    /// Query events for a specific frame from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_frame(&self, run_id: &str, frame: Frame) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_frame(run_id, frame)
    }

    fn take_snapshot(&self) -> SimResult<()> {
        let snapshot = self.snapshot();
        let json = serde_json::to_string(&snapshot)?;
        self.store.save_snapshot(&self.run_id, snapshot.frame, &json)?;
        log::debug!("Snapshot saved at frame {}", snapshot.frame);
        Ok(())
    }
}
