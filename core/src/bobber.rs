//! Bobber actor. Owns the bite: while floating idle it arms a bite timer,
//! and the firing publishes FishFight.

use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    actor::{Actor, ActorContext, Setup},
    config::{BobberConfig, FishermanConfig},
    error::SimResult,
    event::SimEvent,
    scheduler::{FiredTimer, TimerAction, TimerHandle},
    state::StateContainer,
    transform::Transform,
    types::ActorSlot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BobberState {
    /// In the air between rod tip and cast target.
    Flying,
    /// Floating and bobbing, waiting for a bite.
    Idle,
    /// Pulled under by a hooked fish.
    Dipped,
    /// Hanging from the rod tip after a catch.
    Stowed,
}

impl BobberState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flying => "flying",
            Self::Idle   => "idle",
            Self::Dipped => "dipped",
            Self::Stowed => "stowed",
        }
    }
}

pub struct Bobber {
    config:         BobberConfig,
    rod_tip_offset: Vec3,
    flight_time:    Duration,
    transform:      Transform,
    state:          StateContainer<BobberState, Bobber>,
    bite_timer:     Option<TimerHandle>,
    cast_origin:    Vec3,
    cast_target:    Vec3,
    /// Seconds spent in the current Flying/Idle state.
    phase:          f32,
}

impl Bobber {
    pub fn new(config: BobberConfig, fisherman: &FishermanConfig) -> Self {
        let rest = fisherman.rod_tip(fisherman.position);
        Self {
            config,
            rod_tip_offset: fisherman.rod_tip_offset,
            flight_time:    Duration::from_millis(fisherman.cast_ms),
            transform:      Transform::at(rest),
            state:          StateContainer::new(BobberState::Stowed),
            bite_timer:     None,
            cast_origin:    rest,
            cast_target:    rest,
            phase:          0.0,
        }
    }

    pub fn state(&self) -> BobberState { self.state.get() }
    pub fn bite_timer(&self) -> Option<TimerHandle> { self.bite_timer }
    pub fn cast_target(&self) -> Vec3 { self.cast_target }

    fn rod_tip(&self, ctx: &ActorContext<'_>) -> Vec3 {
        ctx.positions.fisherman() + self.rod_tip_offset
    }

    // ── Transitions ────────────────────────────────────────────────

    fn cast(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.bite_timer);

        let half = self.config.cast_jitter_deg.to_radians() * 0.5;
        let yaw = ctx.rng.range_f32(-half..half);
        let fisherman = ctx.positions.fisherman();
        let reach = Vec3::new(yaw.sin(), 0.0, yaw.cos()) * self.config.cast_distance;

        self.cast_origin = self.rod_tip(ctx);
        self.cast_target = Vec3::new(fisherman.x + reach.x, self.config.water_level, fisherman.z + reach.z);
        self.transform.position = self.cast_origin;
        self.phase = 0.0;
        self.state.set(BobberState::Flying, Some(Bobber::tick_flying));
    }

    fn dip(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.bite_timer);
        self.state.set(BobberState::Dipped, Some(Bobber::tick_dipped));
    }

    fn stow(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.bite_timer);
        self.transform.position = self.rod_tip(ctx);
        self.state.set(BobberState::Stowed, None);
    }

    // ── Per-frame routines ─────────────────────────────────────────

    fn tick_flying(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.phase += ctx.dt_secs();
        let flight = self.flight_time.as_secs_f32().max(f32::EPSILON);
        let t = (self.phase / flight).min(1.0);
        let arc = Vec3::Y * self.config.cast_arc_height * 4.0 * t * (1.0 - t);
        self.transform.position = self.cast_origin.lerp(self.cast_target, t) + arc;

        if t >= 1.0 {
            self.transform.position = self.cast_target;
            self.phase = 0.0;
            self.state.set(BobberState::Idle, Some(Bobber::tick_idle));
        }
        Ok(Vec::new())
    }

    fn tick_idle(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.phase += ctx.dt_secs();
        let bob = (TAU * self.config.bob_hz * self.phase).sin() * self.config.bob_amplitude;
        self.transform.position.y = self.config.water_level + bob;

        if self.bite_timer.is_none() {
            let delay = self.config.bite_ms.sample(ctx.rng);
            ctx.schedule_if_absent(&mut self.bite_timer, delay, TimerAction::Bite);
        }
        Ok(Vec::new())
    }

    fn tick_dipped(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        let fish = ctx.positions.fish();
        let pull = (self.config.follow_rate * ctx.dt_secs()).min(1.0);
        let pos = &mut self.transform.position;
        pos.x += (fish.x - pos.x) * pull;
        pos.z += (fish.z - pos.z) * pull;
        pos.y = self.config.water_level - self.config.dip_depth;
        Ok(Vec::new())
    }
}

impl Actor for Bobber {
    fn slot(&self) -> ActorSlot { ActorSlot::Bobber }

    fn state_name(&self) -> &'static str { self.state.get().name() }

    fn position(&self) -> Vec3 { self.transform.position }

    fn setup(&mut self, setup: &mut Setup<'_>) -> SimResult<()> {
        setup.subscribe(SimEvent::Reset);
        setup.subscribe(SimEvent::FishFight);
        setup.subscribe(SimEvent::FishCaught);
        Ok(())
    }

    fn receive(&mut self, event: SimEvent, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        match event {
            SimEvent::Reset      => self.cast(ctx),
            SimEvent::FishFight  => self.dip(ctx),
            SimEvent::FishCaught => self.stow(ctx),
            SimEvent::FishermanFight => {}
        }
        log::debug!("frame={} bobber: {} -> {}", ctx.frame, event.name(), self.state.get().name());
        Ok(Vec::new())
    }

    fn update(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        StateContainer::update(self, |b| &b.state, ctx)
    }

    fn on_timer(&mut self, fired: FiredTimer, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        if fired.action == TimerAction::Bite && self.bite_timer == Some(fired.handle) {
            self.bite_timer = None;
            log::debug!("frame={} bobber: bite", ctx.frame);
            return Ok(vec![SimEvent::FishFight]);
        }
        log::warn!("bobber: ignoring stale timer {:?}", fired.action);
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
