use angler_core::{
    engine::SimEngine,
    snapshot::{SceneSnapshot, SNAPSHOT_INTERVAL},
    stats::SessionStats,
    SimEvent,
};

#[test]
fn every_published_event_is_persisted() {
    let mut engine = SimEngine::build_test("persist".into(), 17).unwrap();
    engine.run_frames(2_400).unwrap();

    let stored = engine.store.events_for_run("persist").unwrap();
    assert_eq!(stored.len(), engine.event_log().len());
    for (db, mem) in stored.iter().zip(engine.event_log()) {
        assert_eq!(db.frame, mem.frame);
        assert_eq!(db.event_type, mem.event_type);
        assert_eq!(db.source, mem.source);
        assert!(db.id.is_some());
    }

    let resets = engine.store.event_count("persist", SimEvent::Reset.name()).unwrap();
    assert_eq!(resets as usize, engine.count_published(SimEvent::Reset));
    assert_eq!(engine.store.run_seed("persist").unwrap(), Some(17));
}

#[test]
fn snapshots_land_on_the_interval() {
    let mut engine = SimEngine::build_test("snap".into(), 4).unwrap();
    engine.run_frames(SNAPSHOT_INTERVAL * 2 + 10).unwrap();

    let (frame, json) = engine.store
        .latest_snapshot_before("snap", SNAPSHOT_INTERVAL * 2 + 5)
        .unwrap()
        .expect("snapshot saved");
    assert_eq!(frame, SNAPSHOT_INTERVAL * 2);

    let snapshot: SceneSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.frame, frame);
    assert_eq!(snapshot.actors.len(), 4);
    assert!(snapshot.actor("fish").is_some());
    assert!(snapshot.actor("fisherman").is_some());

    assert!(engine.store.latest_snapshot_before("snap", SNAPSHOT_INTERVAL - 1).unwrap().is_none());
}

#[test]
fn on_demand_snapshot_reflects_live_state() {
    let engine = SimEngine::build_test("live".into(), 8).unwrap();
    let snapshot = engine.snapshot();

    let fish = snapshot.actor("fish").unwrap();
    assert_eq!(fish.state, "idle");
    assert_eq!(snapshot.actor("bobber").unwrap().state, "flying");
    assert_eq!(snapshot.pending_timers, 1);
}

#[test]
fn running_stats_match_a_replay_of_the_store() {
    let mut engine = SimEngine::build_test("replay".into(), 23).unwrap();
    engine.run_frames(4_800).unwrap();

    let stored = engine.store.events_for_run("replay").unwrap();
    let replayed = SessionStats::from_log(&stored);
    assert_eq!(engine.stats(), replayed);
    assert!(replayed.catches >= 1, "no catch in 80s");
    assert_eq!(engine.count_published(SimEvent::FishCaught), replayed.catches as usize);
}
