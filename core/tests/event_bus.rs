//! Publish semantics with host-defined actors: fan-out order, nested
//! publish ordering, the depth cap, timer firing order and error abort.

use std::any::Any;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use angler_core::{
    actor::{Actor, ActorContext, Setup},
    assets::ClipLibrary,
    bus::MAX_PUBLISH_DEPTH,
    engine::SimEngine,
    scheduler::{FiredTimer, TimerAction},
    snapshot::SNAPSHOT_INTERVAL,
    types::Frame,
    ActorSlot, SimError, SimEvent, SimResult,
};
use glam::Vec3;

type Journal = Arc<Mutex<Vec<String>>>;

/// Records every delivery and answers configured events with a reply.
struct Recorder {
    slot:          ActorSlot,
    label:         &'static str,
    listens:       Vec<SimEvent>,
    replies:       Vec<(SimEvent, SimEvent)>,
    timers:        Vec<(u64, TimerAction)>,
    journal:       Journal,
    track_updates: bool,
    fail_on_event: Option<SimEvent>,
    fail_at_frame: Option<Frame>,
}

impl Recorder {
    fn new(n: u8, label: &'static str, journal: &Journal) -> Self {
        Self {
            slot:          ActorSlot::Custom(n),
            label,
            listens:       Vec::new(),
            replies:       Vec::new(),
            timers:        Vec::new(),
            journal:       Arc::clone(journal),
            track_updates: false,
            fail_on_event: None,
            fail_at_frame: None,
        }
    }

    fn track_updates(mut self) -> Self {
        self.track_updates = true;
        self
    }

    fn fail_on(mut self, event: SimEvent) -> Self {
        self.fail_on_event = Some(event);
        self
    }

    fn fail_at(mut self, frame: Frame) -> Self {
        self.fail_at_frame = Some(frame);
        self
    }

    fn listen(mut self, events: &[SimEvent]) -> Self {
        self.listens.extend_from_slice(events);
        self
    }

    fn reply(mut self, on: SimEvent, with: SimEvent) -> Self {
        self.replies.push((on, with));
        self
    }

    fn arm(mut self, delay_ms: u64, action: TimerAction) -> Self {
        self.timers.push((delay_ms, action));
        self
    }

    fn note(&self, what: String) {
        self.journal.lock().unwrap().push(format!("{}:{what}", self.label));
    }
}

impl Actor for Recorder {
    fn slot(&self) -> ActorSlot { self.slot }

    fn state_name(&self) -> &'static str { "listening" }

    fn position(&self) -> Vec3 { Vec3::ZERO }

    fn setup(&mut self, setup: &mut Setup<'_>) -> SimResult<()> {
        for event in &self.listens {
            setup.subscribe(*event);
        }
        Ok(())
    }

    fn receive(&mut self, event: SimEvent, _ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.note(event.name().to_string());
        if self.fail_on_event == Some(event) {
            return Err(anyhow::anyhow!("{} rejected {}", self.label, event.name()).into());
        }
        Ok(self.replies.iter().filter(|(on, _)| *on == event).map(|(_, with)| *with).collect())
    }

    fn update(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        if self.fail_at_frame == Some(ctx.frame) {
            return Err(anyhow::anyhow!("{} failed at frame {}", self.label, ctx.frame).into());
        }
        if self.track_updates {
            self.note(format!("update@{}", ctx.frame));
        }
        for (delay, action) in self.timers.drain(..) {
            ctx.schedule_once(Duration::from_millis(delay), action);
        }
        Ok(Vec::new())
    }

    fn on_timer(&mut self, fired: FiredTimer, _ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.note(format!("{:?}", fired.action));
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn Any { self }
}

fn engine_with(actors: Vec<Recorder>) -> SimEngine {
    let store = SimEngine::test_store("bus-test", 1).expect("store");
    let mut engine = SimEngine::new("bus-test".into(), 1, Duration::from_millis(16), store);
    for actor in actors {
        engine.register(Box::new(actor)).expect("register");
    }
    engine.start(&ClipLibrary::builtin()).expect("start");
    engine
}

fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

#[test]
fn fan_out_follows_subscription_order() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![
        Recorder::new(1, "a", &journal).listen(&[SimEvent::Reset]),
        Recorder::new(2, "b", &journal).listen(&[SimEvent::Reset]),
        Recorder::new(3, "c", &journal).listen(&[SimEvent::Reset]),
    ]);
    assert_eq!(entries(&journal), ["a:reset", "b:reset", "c:reset"]);

    engine.publish(SimEvent::Reset).unwrap();
    assert_eq!(entries(&journal).len(), 6);
    assert_eq!(entries(&journal)[3..], ["a:reset", "b:reset", "c:reset"]);
}

#[test]
fn nested_publish_runs_before_remaining_subscribers() {
    let journal = Journal::default();
    let both = [SimEvent::FishFight, SimEvent::FishCaught];
    let mut engine = engine_with(vec![
        Recorder::new(1, "a", &journal)
            .listen(&[SimEvent::FishFight])
            .reply(SimEvent::FishFight, SimEvent::FishCaught),
        Recorder::new(2, "b", &journal).listen(&both),
        Recorder::new(3, "c", &journal).listen(&both),
    ]);

    engine.publish(SimEvent::FishFight).unwrap();
    assert_eq!(entries(&journal), [
        "a:fish_fight",
        "b:fish_caught",
        "c:fish_caught",
        "b:fish_fight",
        "c:fish_fight",
    ]);

    let log: Vec<(&str, &str, u32)> = engine
        .event_log()
        .iter()
        .map(|e| (e.event_type.as_str(), e.source.as_str(), e.depth))
        .collect();
    assert_eq!(log, [
        ("reset", "engine", 0),
        ("fish_fight", "external", 0),
        ("fish_caught", "custom", 1),
    ]);
}

#[test]
fn publish_without_subscribers_is_logged_noop() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![Recorder::new(1, "a", &journal).listen(&[SimEvent::Reset])]);

    engine.publish(SimEvent::FishermanFight).unwrap();
    assert_eq!(entries(&journal), ["a:reset"]);
    assert_eq!(engine.count_published(SimEvent::FishermanFight), 1);
}

#[test]
fn runaway_ping_pong_hits_depth_cap() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![
        Recorder::new(1, "ping", &journal)
            .listen(&[SimEvent::FishFight])
            .reply(SimEvent::FishFight, SimEvent::FishermanFight),
        Recorder::new(2, "pong", &journal)
            .listen(&[SimEvent::FishermanFight])
            .reply(SimEvent::FishermanFight, SimEvent::FishFight),
    ]);

    let err = engine.publish(SimEvent::FishFight).unwrap_err();
    match err {
        SimError::PublishDepthExceeded { depth, .. } => assert_eq!(depth, MAX_PUBLISH_DEPTH + 1),
        other => panic!("expected depth error, got {other}"),
    }
    // Reset at startup plus depths 0..=MAX.
    assert_eq!(engine.event_log().len(), MAX_PUBLISH_DEPTH + 2);
}

#[test]
fn timers_fire_in_due_order_then_arming_order() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![
        Recorder::new(1, "t", &journal)
            .arm(50, TimerAction::Bite)
            .arm(20, TimerAction::FlopBurst)
            .arm(20, TimerAction::CastLanded),
    ]);

    engine.run_frames(10).unwrap();
    assert_eq!(entries(&journal), ["t:FlopBurst", "t:CastLanded", "t:Bite"]);
    assert_eq!(engine.scheduler().pending_count(), 0);
}

#[test]
fn registration_is_closed_after_start() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![Recorder::new(1, "a", &journal)]);

    assert!(engine.register(Box::new(Recorder::new(2, "late", &journal))).is_err());
}

#[test]
fn duplicate_slots_are_rejected() {
    let journal = Journal::default();
    let store = SimEngine::test_store("dup", 1).unwrap();
    let mut engine = SimEngine::new("dup".into(), 1, Duration::from_millis(16), store);

    engine.register(Box::new(Recorder::new(4, "x", &journal))).unwrap();
    assert!(engine.register(Box::new(Recorder::new(4, "y", &journal))).is_err());
}

#[test]
fn handler_error_skips_remaining_subscribers() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![
        Recorder::new(1, "a", &journal)
            .listen(&[SimEvent::FishFight])
            .fail_on(SimEvent::FishFight),
        Recorder::new(2, "b", &journal).listen(&[SimEvent::FishFight]),
    ]);

    assert!(matches!(engine.publish(SimEvent::FishFight), Err(SimError::Other(_))));
    assert_eq!(entries(&journal), ["a:fish_fight"]);
}

#[test]
fn update_error_aborts_rest_of_frame() {
    let journal = Journal::default();
    let mut engine = engine_with(vec![
        Recorder::new(1, "a", &journal).fail_at(SNAPSHOT_INTERVAL),
        Recorder::new(2, "b", &journal).track_updates(),
    ]);

    engine.run_frames(SNAPSHOT_INTERVAL - 1).unwrap();
    assert_eq!(entries(&journal).len() as u64, SNAPSHOT_INTERVAL - 1);

    engine.clock.resume();
    let err = engine.tick().unwrap_err();
    assert!(matches!(err, SimError::Other(_)), "got {err}");

    // b never ran on the failing frame and no snapshot was written.
    let last = entries(&journal).last().cloned().unwrap();
    assert_eq!(last, format!("b:update@{}", SNAPSHOT_INTERVAL - 1));
    assert!(engine.store.latest_snapshot_before("bus-test", SNAPSHOT_INTERVAL).unwrap().is_none());
}
