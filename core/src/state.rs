//! Per-actor state container.
//!
//! Holds the current state tag and the tick routine bound to it.
//! `set` replaces both at once; the routine is never merged or kept
//! across a transition.

use crate::{actor::ActorContext, error::SimResult, event::SimEvent};

/// A per-frame routine bound to a state. Receives the owning actor.
pub type TickFn<A> = fn(&mut A, &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>>;

pub struct StateContainer<S, A> {
    current: S,
    on_tick: Option<TickFn<A>>,
}

impl<S: Copy + PartialEq + std::fmt::Debug, A> StateContainer<S, A> {
    pub fn new(initial: S) -> Self {
        Self { current: initial, on_tick: None }
    }

    /// Replace the state tag and its tick routine together.
    pub fn set(&mut self, tag: S, on_tick: Option<TickFn<A>>) {
        log::trace!("state: {:?} -> {:?}", self.current, tag);
        self.current = tag;
        self.on_tick = on_tick;
    }

    pub fn get(&self) -> S {
        self.current
    }

    pub fn is(&self, tag: S) -> bool {
        self.current == tag
    }

    /// Run the active routine against `actor`. No routine is a no-op.
    ///
    /// `select` picks this container out of the actor so the routine
    /// can receive the actor mutably.
    pub fn update(
        actor: &mut A,
        select: fn(&A) -> &Self,
        ctx: &mut ActorContext<'_>,
    ) -> SimResult<Vec<SimEvent>> {
        match select(actor).on_tick {
            Some(tick) => tick(actor, ctx),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actor::Positions, rng::ActorRng, scheduler::Scheduler, types::ActorSlot};
    use std::time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Light { Off, Green, Red }

    struct Lamp {
        state: StateContainer<Light, Lamp>,
        ticks: Vec<&'static str>,
    }

    fn green(lamp: &mut Lamp, _ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        lamp.ticks.push("green");
        Ok(Vec::new())
    }

    fn red(lamp: &mut Lamp, _ctx: &mut ActorContext<'_>) -> SimResult<Vec<SimEvent>> {
        lamp.ticks.push("red");
        Ok(vec![SimEvent::FishCaught])
    }

    fn run(lamp: &mut Lamp) -> Vec<SimEvent> {
        let positions = Positions::default();
        let mut scheduler = Scheduler::new();
        let mut rng = ActorRng::new(1, 0);
        let mut ctx = ActorContext::new(
            ActorSlot::Custom(0), 1, Duration::ZERO, Duration::ZERO,
            &positions, &mut rng, &mut scheduler,
        );
        StateContainer::update(lamp, |l| &l.state, &mut ctx).unwrap()
    }

    #[test]
    fn last_set_wins_and_replaces_routine() {
        let mut lamp = Lamp { state: StateContainer::new(Light::Off), ticks: Vec::new() };
        lamp.state.set(Light::Green, Some(green));
        lamp.state.set(Light::Red, Some(red));
        lamp.state.set(Light::Green, Some(green));

        assert_eq!(lamp.state.get(), Light::Green);
        assert!(run(&mut lamp).is_empty());
        assert_eq!(lamp.ticks, vec!["green"]);

        lamp.state.set(Light::Red, Some(red));
        assert_eq!(run(&mut lamp), vec![SimEvent::FishCaught]);
        assert_eq!(lamp.ticks, vec!["green", "red"]);
    }

    #[test]
    fn no_routine_is_noop() {
        let mut lamp = Lamp { state: StateContainer::new(Light::Off), ticks: Vec::new() };
        lamp.state.set(Light::Green, Some(green));
        lamp.state.set(Light::Off, None);

        assert!(lamp.state.is(Light::Off));
        assert!(run(&mut lamp).is_empty());
        assert!(lamp.ticks.is_empty());
    }
}
