//! Fish actor.
//!
//! STATES:
//!   Idle:        entered on Reset. Parked at the spawn point facing the
//!                fisherman; no per-frame behaviour.
//!   Swimming:    entered on FishFight (the bite). Snaps under the bobber
//!                and flees, wandering on a direction-change timer.
//!   BeingReeled: entered on FishermanFight. Swims back toward the
//!                fisherman and publishes FishCaught once close enough.
//!   Flopping:    entered on FishCaught. Lies flat and plays randomised
//!                flop bursts until the next Reset.
//!
//! Every transition cancels the timers of the state being left, so a
//! stale timer can never fire into the new state.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    actor::{Actor, ActorContext, Setup},
    animation::ClipPlayback,
    assets::FISH_FLOP_CLIP,
    config::FishConfig,
    error::SimResult,
    event::SimEvent,
    rng::ActorRng,
    scheduler::{FiredTimer, TimerAction, TimerHandle},
    state::StateContainer,
    transform::{yaw_of, yaw_towards, Transform},
    types::ActorSlot,
};

/// Floor for flop playback speed. Requests at or below zero get this.
pub const MIN_FLOP_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FishState {
    Idle,
    Swimming,
    BeingReeled,
    Flopping,
}

impl FishState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle        => "idle",
            Self::Swimming    => "swimming",
            Self::BeingReeled => "being_reeled",
            Self::Flopping    => "flopping",
        }
    }
}

/// Which way a direction change aims before jitter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwimHeading {
    TowardFisherman,
    AwayFromFisherman,
}

impl SwimHeading {
    /// Full jitter width in degrees for this heading.
    pub fn spread_deg(&self, config: &FishConfig) -> f32 {
        match self {
            Self::TowardFisherman   => config.toward_spread_deg,
            Self::AwayFromFisherman => config.away_spread_deg,
        }
    }

    /// Yaw of the un-jittered heading, `None` if fish and fisherman
    /// share an XZ position.
    pub fn base_yaw(&self, fish: Vec3, fisherman: Vec3) -> Option<f32> {
        match self {
            Self::TowardFisherman   => yaw_towards(fish, fisherman),
            Self::AwayFromFisherman => yaw_towards(fisherman, fish),
        }
    }
}

/// Uniform yaw offset in radians within ±spread/2.
pub fn heading_offset(rng: &mut ActorRng, spread_deg: f32) -> f32 {
    (rng.next_f32() - 0.5) * spread_deg.to_radians()
}

/// Effective flop playback speed for a requested one.
pub fn flop_speed(requested: f32) -> f32 {
    if requested > 0.0 {
        requested
    } else {
        MIN_FLOP_SPEED
    }
}

pub struct Fish {
    config:          FishConfig,
    transform:       Transform,
    state:           StateContainer<FishState, Fish>,
    heading:         SwimHeading,
    direction_timer: Option<TimerHandle>,
    flop_timer:      Option<TimerHandle>,
    flop:            ClipPlayback,
    playback_speed:  f32,
}

impl Fish {
    pub fn new(config: FishConfig) -> Self {
        let mut transform = Transform::at(config.spawn_position);
        transform.scale = Vec3::splat(config.scale);
        Self {
            config,
            transform,
            state:           StateContainer::new(FishState::Idle),
            heading:         SwimHeading::TowardFisherman,
            direction_timer: None,
            flop_timer:      None,
            flop:            ClipPlayback::new(FISH_FLOP_CLIP, 1.0),
            playback_speed:  1.0,
        }
    }

    pub fn state(&self) -> FishState { self.state.get() }
    pub fn heading(&self) -> SwimHeading { self.heading }
    pub fn transform(&self) -> &Transform { &self.transform }
    pub fn direction_timer(&self) -> Option<TimerHandle> { self.direction_timer }
    pub fn flop_timer(&self) -> Option<TimerHandle> { self.flop_timer }
    pub fn flop(&self) -> &ClipPlayback { &self.flop }
    pub fn playback_speed(&self) -> f32 { self.playback_speed }

    // ── Transitions ────────────────────────────────────────────────

    fn reset(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.direction_timer);
        ctx.cancel(&mut self.flop_timer);
        self.flop.stop();
        self.playback_speed = 1.0;

        self.transform = Transform::at(self.config.spawn_position);
        self.transform.scale = Vec3::splat(self.config.scale);
        self.transform.face_towards(ctx.positions.fisherman());
        self.heading = SwimHeading::TowardFisherman;
        self.state.set(FishState::Idle, None);
    }

    fn hooked(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.direction_timer);
        ctx.cancel(&mut self.flop_timer);
        self.flop.stop();

        let bobber = ctx.positions.bobber();
        self.transform.position = Vec3::new(bobber.x, self.config.swim_depth, bobber.z);
        self.transform.rotation = Quat::IDENTITY;
        self.transform.face_away_from(ctx.positions.fisherman());
        self.heading = SwimHeading::AwayFromFisherman;
        self.state.set(FishState::Swimming, Some(Fish::tick_swimming));
    }

    fn reeled(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.direction_timer);
        ctx.cancel(&mut self.flop_timer);

        self.transform.rotation = Quat::IDENTITY;
        self.transform.face_towards(ctx.positions.fisherman());
        self.heading = SwimHeading::TowardFisherman;
        self.state.set(FishState::BeingReeled, Some(Fish::tick_reeled));
    }

    fn landed(&mut self, ctx: &mut ActorContext<'_>) {
        ctx.cancel(&mut self.direction_timer);

        let yaw = yaw_of(self.transform.rotation);
        self.transform.rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_z(FRAC_PI_2);
        self.state.set(FishState::Flopping, Some(Fish::tick_flopping));
    }

    // ── Per-frame routines ─────────────────────────────────────────

    fn tick_swimming(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.arm_direction_change(ctx);
        self.transform.translate_forward(self.config.speed * ctx.dt_secs());
        Ok(Vec::new())
    }

    fn tick_reeled(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.arm_direction_change(ctx);
        self.transform.translate_forward(self.config.speed * ctx.dt_secs());

        let distance = self.transform.position.distance(ctx.positions.fisherman());
        if distance < self.config.catch_distance {
            log::debug!("fish: within {distance:.1} of fisherman, caught");
            return Ok(vec![SimEvent::FishCaught]);
        }
        Ok(Vec::new())
    }

    fn tick_flopping(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        if self.flop_timer.is_none() && !self.flop.is_playing() {
            let delay = self.config.flop_delay_ms.sample(ctx.rng);
            ctx.schedule_if_absent(&mut self.flop_timer, delay, TimerAction::FlopBurst);
        }
        self.flop.advance(ctx.dt_secs() * self.playback_speed);
        Ok(Vec::new())
    }

    // ── Timer behaviours ───────────────────────────────────────────

    fn arm_direction_change(&mut self, ctx: &mut ActorContext<'_>) {
        if self.direction_timer.is_none() {
            let delay = self.config.direction_change_ms.sample(ctx.rng);
            ctx.schedule_if_absent(&mut self.direction_timer, delay, TimerAction::ChangeDirection);
        }
    }

    fn change_direction(&mut self, ctx: &mut ActorContext<'_>) {
        let fisherman = ctx.positions.fisherman();
        let Some(base) = self.heading.base_yaw(self.transform.position, fisherman) else {
            return;
        };
        let spread = self.heading.spread_deg(&self.config);
        self.transform.set_yaw(base + heading_offset(ctx.rng, spread));
    }

    fn start_flop_burst(&mut self, ctx: &mut ActorContext<'_>) {
        self.playback_speed = flop_speed(self.config.flop_speed.sample(ctx.rng));
        let repetitions = self.config.flop_repetitions.sample(ctx.rng);
        self.flop.reset();
        self.flop.play(repetitions);
        log::debug!(
            "fish: flop burst x{repetitions} at speed {:.2}",
            self.playback_speed
        );
    }
}

impl Actor for Fish {
    fn slot(&self) -> ActorSlot { ActorSlot::Fish }

    fn state_name(&self) -> &'static str { self.state.get().name() }

    fn position(&self) -> Vec3 { self.transform.position }

    fn setup(&mut self, setup: &mut Setup<'_>) -> SimResult<()> {
        let clip = setup.assets.clip(FISH_FLOP_CLIP)?;
        self.flop = ClipPlayback::new(clip.name, clip.duration_secs);
        for event in SimEvent::ALL {
            setup.subscribe(event);
        }
        Ok(())
    }

    fn receive(&mut self, event: SimEvent, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        let before = self.state.get();
        match event {
            SimEvent::Reset          => self.reset(ctx),
            SimEvent::FishFight      => self.hooked(ctx),
            SimEvent::FishermanFight => self.reeled(ctx),
            SimEvent::FishCaught     => self.landed(ctx),
        }
        log::debug!(
            "frame={} fish: {} on {} -> {}",
            ctx.frame, before.name(), event.name(), self.state.get().name()
        );
        Ok(Vec::new())
    }

    fn update(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        StateContainer::update(self, |f| &f.state, ctx)
    }

    fn on_timer(&mut self, fired: FiredTimer, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        match fired.action {
            TimerAction::ChangeDirection if self.direction_timer == Some(fired.handle) => {
                self.direction_timer = None;
                self.change_direction(ctx);
            }
            TimerAction::FlopBurst if self.flop_timer == Some(fired.handle) => {
                self.flop_timer = None;
                self.start_flop_burst(ctx);
            }
            other => log::warn!("fish: ignoring stale timer {other:?}"),
        }
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
