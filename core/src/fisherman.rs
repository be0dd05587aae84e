//! Fisherman actor.
//!
//! STATES:
//!   Casting:  entered on Reset; the cast timer moves on to Waiting.
//!   Waiting:  watching the bobber.
//!   Fighting: entered on FishFight. After a random struggle the fight
//!             timer publishes FishermanFight.
//!   Reeling:  entered on FishermanFight; cranks the reel.
//!   Landed:   entered on FishCaught. Optionally publishes Reset later
//!             to start the next cast.

use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    actor::{Actor, ActorContext, Setup},
    config::FishermanConfig,
    error::SimResult,
    event::SimEvent,
    scheduler::{FiredTimer, TimerAction, TimerHandle},
    state::StateContainer,
    transform::Transform,
    types::ActorSlot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FishermanState {
    Casting,
    Waiting,
    Fighting,
    Reeling,
    Landed,
}

impl FishermanState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Casting  => "casting",
            Self::Waiting  => "waiting",
            Self::Fighting => "fighting",
            Self::Reeling  => "reeling",
            Self::Landed   => "landed",
        }
    }
}

pub struct Fisherman {
    config:      FishermanConfig,
    transform:   Transform,
    state:       StateContainer<FishermanState, Fisherman>,
    cast_timer:  Option<TimerHandle>,
    fight_timer: Option<TimerHandle>,
    reset_timer: Option<TimerHandle>,
    /// Reel crank angle in radians, wrapped to [0, 2π).
    crank_angle: f32,
}

impl Fisherman {
    pub fn new(config: FishermanConfig) -> Self {
        let transform = Transform::at(config.position);
        Self {
            config,
            transform,
            state:       StateContainer::new(FishermanState::Casting),
            cast_timer:  None,
            fight_timer: None,
            reset_timer: None,
            crank_angle: 0.0,
        }
    }

    pub fn state(&self) -> FishermanState { self.state.get() }
    pub fn transform(&self) -> &Transform { &self.transform }
    pub fn crank_angle(&self) -> f32 { self.crank_angle }
    pub fn rod_tip(&self) -> Vec3 { self.config.rod_tip(self.transform.position) }

    fn cancel_all(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.cast_timer);
        ctx.cancel(&mut self.fight_timer);
        ctx.cancel(&mut self.reset_timer);
    }

    // ── Transitions ────────────────────────────────────────────────

    fn cast(&mut self, ctx: &mut ActorContext<'_>) {
        self.cancel_all(ctx);
        self.transform = Transform::at(self.config.position);
        self.crank_angle = 0.0;
        let delay = Duration::from_millis(self.config.cast_ms);
        ctx.schedule_if_absent(&mut self.cast_timer, delay, TimerAction::CastLanded);
        self.state.set(FishermanState::Casting, None);
    }

    fn fight(&mut self, ctx: &mut ActorContext<'_>) {
        self.cancel_all(ctx);
        let struggle = self.config.fight_ms.sample(ctx.rng);
        ctx.schedule_if_absent(&mut self.fight_timer, struggle, TimerAction::FightOver);
        self.state.set(FishermanState::Fighting, Some(Fisherman::tick_fighting));
    }

    fn reel(&mut self, ctx: &mut ActorContext<'_>) {
        self.cancel_all(ctx);
        self.state.set(FishermanState::Reeling, Some(Fisherman::tick_reeling));
    }

    fn land(&mut self, ctx: &mut ActorContext<'_>) {
        self.cancel_all(ctx);
        if let Some(ms) = self.config.auto_reset_ms {
            ctx.schedule_if_absent(&mut self.reset_timer, Duration::from_millis(ms), TimerAction::AutoReset);
        }
        self.state.set(FishermanState::Landed, None);
    }

    // ── Per-frame routines ─────────────────────────────────────────

    fn tick_waiting(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.transform.face_towards(ctx.positions.bobber());
        Ok(Vec::new())
    }

    fn tick_fighting(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.transform.face_towards(ctx.positions.fish());
        Ok(Vec::new())
    }

    fn tick_reeling(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.transform.face_towards(ctx.positions.fish());
        self.crank_angle = (self.crank_angle + TAU * self.config.reel_crank_rps * ctx.dt_secs()) % TAU;
        Ok(Vec::new())
    }
}

impl Actor for Fisherman {
    fn slot(&self) -> ActorSlot { ActorSlot::Fisherman }

    fn state_name(&self) -> &'static str { self.state.get().name() }

    fn position(&self) -> Vec3 { self.transform.position }

    fn setup(&mut self, setup: &mut Setup<'_>) -> SimResult<()> {
        self.transform = Transform::at(self.config.position);
        for event in SimEvent::ALL {
            setup.subscribe(event);
        }
        Ok(())
    }

    fn receive(&mut self, event: SimEvent, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        let before = self.state.get();
        match event {
            SimEvent::Reset          => self.cast(ctx),
            SimEvent::FishFight      => self.fight(ctx),
            SimEvent::FishermanFight => self.reel(ctx),
            SimEvent::FishCaught     => self.land(ctx),
        }
        log::debug!(
            "frame={} fisherman: {} on {} -> {}",
            ctx.frame, before.name(), event.name(), self.state.get().name()
        );
        Ok(Vec::new())
    }

    fn update(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        StateContainer::update(self, |f| &f.state, ctx)
    }

    fn on_timer(&mut self, fired: FiredTimer, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        match fired.action {
            TimerAction::CastLanded if self.cast_timer == Some(fired.handle) => {
                self.cast_timer = None;
                self.state.set(FishermanState::Waiting, Some(Fisherman::tick_waiting));
                log::debug!("frame={} fisherman: cast landed", ctx.frame);
                Ok(Vec::new())
            }
            TimerAction::FightOver if self.fight_timer == Some(fired.handle) => {
                self.fight_timer = None;
                Ok(vec![SimEvent::FishermanFight])
            }
            TimerAction::AutoReset if self.reset_timer == Some(fired.handle) => {
                self.reset_timer = None;
                Ok(vec![SimEvent::Reset])
            }
            other => {
                log::warn!("fisherman: ignoring stale timer {other:?}");
                Ok(Vec::new())
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
