//! Fishing line. Spans rod tip to bobber every frame; slack or taut.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{
    actor::{Actor, ActorContext, Setup},
    config::{FishermanConfig, LineConfig},
    error::SimResult,
    event::SimEvent,
    state::StateContainer,
    transform::Transform,
    types::ActorSlot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineState {
    Slack,
    Taut,
}

impl LineState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Taut  => "taut",
        }
    }
}

pub struct FishingLine {
    config:         LineConfig,
    rod_tip_offset: Vec3,
    transform:      Transform,
    state:          StateContainer<LineState, FishingLine>,
    start:          Vec3,
    end:            Vec3,
    /// Shortest span seen since going taut; the reel takes up slack.
    taut_length:    f32,
    tension:        f32,
    points:         Vec<Vec3>,
}

impl FishingLine {
    pub fn new(config: LineConfig, fisherman: &FishermanConfig) -> Self {
        let tip = fisherman.rod_tip(fisherman.position);
        let points = vec![tip; config.segments + 1];
        Self {
            config,
            rod_tip_offset: fisherman.rod_tip_offset,
            transform:      Transform::at(tip),
            state:          StateContainer::new(LineState::Slack),
            start:          tip,
            end:            tip,
            taut_length:    0.0,
            tension:        0.0,
            points,
        }
    }

    pub fn state(&self) -> LineState { self.state.get() }
    /// 0 = no pull, 1 = at the configured max stretch.
    pub fn tension(&self) -> f32 { self.tension }
    pub fn points(&self) -> &[Vec3] { &self.points }
    pub fn span(&self) -> f32 { self.start.distance(self.end) }

    fn follow(&mut self, ctx: &ActorContext<'_>) {
        self.start = ctx.positions.fisherman() + self.rod_tip_offset;
        self.end = ctx.positions.bobber();
        self.transform.position = self.start.lerp(self.end, 0.5);
    }

    fn rebuild(&mut self, sag: f32) {
        let n = self.config.segments.max(1);
        self.points.clear();
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let droop = Vec3::Y * sag * 4.0 * t * (1.0 - t);
            self.points.push(self.start.lerp(self.end, t) - droop);
        }
    }

    // ── Transitions ────────────────────────────────────────────────

    fn slacken(&mut self) {
        self.tension = 0.0;
        self.state.set(LineState::Slack, Some(FishingLine::tick_slack));
    }

    fn tighten(&mut self, ctx: &ActorContext<'_>) {
        self.follow(ctx);
        self.taut_length = self.span().max(f32::EPSILON);
        self.state.set(LineState::Taut, Some(FishingLine::tick_taut));
    }

    // ── Per-frame routines ─────────────────────────────────────────

    fn tick_slack(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.follow(ctx);
        self.rebuild(self.config.slack_sag);
        Ok(Vec::new())
    }

    fn tick_taut(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        self.follow(ctx);
        let span = self.span();
        self.taut_length = self.taut_length.min(span).max(f32::EPSILON);

        let give = (self.config.max_stretch - 1.0).max(f32::EPSILON);
        self.tension = ((span / self.taut_length - 1.0) / give).clamp(0.0, 1.0);
        self.rebuild(self.config.taut_sag * (1.0 - self.tension));
        Ok(Vec::new())
    }
}

impl Actor for FishingLine {
    fn slot(&self) -> ActorSlot { ActorSlot::Line }

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
            SimEvent::Reset | SimEvent::FishCaught => self.slacken(),
            SimEvent::FishFight                    => self.tighten(ctx),
            SimEvent::FishermanFight               => {}
        }
        log::debug!("frame={} line: {} -> {}", ctx.frame, event.name(), self.state.get().name());
        Ok(Vec::new())
    }

    fn update(&mut self, ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        StateContainer::update(self, |l| &l.state, ctx)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
