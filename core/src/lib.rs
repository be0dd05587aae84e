//! Angler core: the actor state machines behind the fishing scene.
//!
//! ```text
//! SimEngine  (engine.rs)     ← per-frame driver, publish dispatch
//!   ├── EventBus   (bus.rs)        ← event → subscribers
//!   ├── Scheduler  (scheduler.rs)  ← cancellable one-shot timers
//!   ├── RngBank    (rng.rs)        ← one seeded stream per actor
//!   └── actors: Fisherman, FishingLine, Bobber, Fish
//!         each owning a Transform and a StateContainer (state.rs)
//! ```

pub mod actor;
pub mod animation;
pub mod assets;
pub mod bobber;
pub mod bus;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod fish;
pub mod fisherman;
pub mod line;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod store;
pub mod transform;
pub mod types;

pub use engine::SimEngine;
pub use error::{SimError, SimResult};
pub use event::SimEvent;
pub use types::ActorSlot;
