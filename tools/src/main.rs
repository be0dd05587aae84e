//! angler-runner: headless driver for the fishing scene.
//!
//! Usage:
//!   angler-runner --seed 12345 --frames 3600 --db run.db
//!   angler-runner --seed 12345 --data-dir ./data --ipc-mode

use anyhow::Result;
use angler_core::{
    assets::ClipLibrary,
    config::SimConfig,
    engine::SimEngine,
    snapshot::ActorSnapshot,
    stats::SessionStats,
    store::SimStore,
    types::Frame,
    SimEvent,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Publish { event: SimEvent },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    frame:          Frame,
    elapsed_ms:     u64,
    paused:         bool,
    pending_timers: usize,
    actors:         Vec<ActorSnapshot>,
    line_tension:   f32,
    stats:          SessionStats,
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("angler-runner aborted: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let frames = parse_arg(&args, "--frames", 3600u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    if !ipc_mode {
        println!("Angler scene runner");
        println!("  seed:      {seed}");
        println!("  frames:    {frames}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    // Fall back to built-in tuning when the data dir is absent, but a
    // present-and-broken file is an error.
    let (config, clips) = if Path::new(data_dir).exists() {
        (SimConfig::load(data_dir)?, ClipLibrary::load(data_dir)?)
    } else {
        log::warn!("data dir {data_dir} not found, using built-in scene");
        (SimConfig::default(), ClipLibrary::builtin())
    };

    let store = if db == ":memory:" { SimStore::in_memory()? } else { SimStore::open(db)? };
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let mut engine = SimEngine::build(run_id.clone(), seed, &config, &clips, store)?;

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        engine.run_frames(frames)?;
        print_summary(&engine, &run_id, frames)?;
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("bad ipc command: {e}");
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => engine.run_frames(count)?,
            IpcCommand::Publish { event } => engine.publish(event)?,
            IpcCommand::GetState => {}
        }
        let state = build_ui_state(engine);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine) -> UiState {
    let snapshot = engine.snapshot();
    UiState {
        frame:          snapshot.frame,
        elapsed_ms:     snapshot.clock.elapsed_ms(),
        paused:         snapshot.clock.paused,
        pending_timers: snapshot.pending_timers,
        actors:         snapshot.actors,
        line_tension:   engine.line().map(|l| l.tension()).unwrap_or(0.0),
        stats:          engine.stats(),
    }
}

fn print_summary(engine: &SimEngine, run_id: &str, frames: u64) -> Result<()> {
    let stats = engine.stats();
    let stored = engine.store.events_for_run(run_id)?.len();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {run_id}");
    println!("  frames run:     {frames}");
    println!("  elapsed:        {:.1}s", engine.clock.elapsed.as_secs_f64());
    println!("  events logged:  {stored}");
    println!("  casts:          {}", stats.casts);
    println!("  bites:          {}", stats.bites);
    println!("  catches:        {}", stats.catches);
    match stats.mean_fight_ms {
        Some(ms) => println!("  mean fight:     {:.1}s", ms / 1000.0),
        None     => println!("  mean fight:     (no catches yet)"),
    }

    println!();
    println!("=== FINAL SCENE ===");
    for actor in engine.snapshot().actors {
        let p = actor.position;
        println!(
            "  {:<10} {:<13} ({:.1}, {:.1}, {:.1})",
            actor.actor, actor.state, p.x, p.y, p.z
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
