//! Timer-driven behaviour scheduler.
//!
//! RULES:
//!   - Timers fire on tick boundaries only, never mid-tick.
//!   - A timer never fires on the frame it was armed, even with a zero delay.
//!   - Firing removes the timer from the pending set; the owning actor
//!     clears its own `Option<TimerHandle>` slot when it sees the firing.
//!   - "At most one timer of a kind per actor" is a caller discipline:
//!     check the slot is `None` before calling `schedule_once`.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{ActorSlot, Frame};

/// Opaque handle to a pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Closed set of deferred behaviours an actor can arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerAction {
    /// Fish: pick a new swim heading.
    ChangeDirection,
    /// Fish: start a flop burst.
    FlopBurst,
    /// Bobber: a fish bites.
    Bite,
    /// Fisherman: the cast has landed.
    CastLanded,
    /// Fisherman: the initial struggle is over, start reeling.
    FightOver,
    /// Fisherman: start the next cast after a catch.
    AutoReset,
}

#[derive(Debug, Clone)]
struct PendingTimer {
    owner:       ActorSlot,
    action:      TimerAction,
    due:         Duration,
    armed_frame: Frame,
}

/// A timer popped from the pending set because its due time passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub owner:  ActorSlot,
    pub action: TimerAction,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    pending: BTreeMap<TimerHandle, PendingTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer due `delay` after `now`.
    pub fn schedule_once(
        &mut self,
        owner: ActorSlot,
        action: TimerAction,
        now: Duration,
        frame: Frame,
        delay: Duration,
    ) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.pending.insert(handle, PendingTimer {
            owner,
            action,
            due: now + delay,
            armed_frame: frame,
        });
        handle
    }

    /// Cancel the timer in `slot` and reset the slot to `None`.
    /// An empty slot or an already fired handle is a no-op.
    pub fn cancel(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.pending.remove(&handle);
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Due time of a pending timer.
    pub fn due_at(&self, handle: TimerHandle) -> Option<Duration> {
        self.pending.get(&handle).map(|t| t.due)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: ActorSlot) -> usize {
        self.pending.values().filter(|t| t.owner == owner).count()
    }

    /// Remove and return the earliest timer that is due at `now` and was
    /// armed before `frame`. Ties on due time break by arming order.
    pub fn pop_due(&mut self, now: Duration, frame: Frame) -> Option<FiredTimer> {
        let handle = self
            .pending
            .iter()
            .filter(|(_, t)| t.due <= now && t.armed_frame < frame)
            .min_by_key(|(h, t)| (t.due, **h))
            .map(|(h, _)| *h)?;
        let timer = self.pending.remove(&handle)?;
        Some(FiredTimer { handle, owner: timer.owner, action: timer.action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FISH: ActorSlot = ActorSlot::Fish;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fires_once_after_delay() {
        let mut s = Scheduler::new();
        let h = s.schedule_once(FISH, TimerAction::Bite, ms(0), 0, ms(300));

        assert_eq!(s.pop_due(ms(299), 1), None);
        let fired = s.pop_due(ms(300), 2).expect("due at 300ms");
        assert_eq!(fired.handle, h);
        assert_eq!(fired.action, TimerAction::Bite);
        assert_eq!(s.pop_due(ms(10_000), 3), None);
        assert!(!s.is_pending(h));
    }

    #[test]
    fn never_fires_on_arming_frame() {
        let mut s = Scheduler::new();
        s.schedule_once(FISH, TimerAction::Bite, ms(100), 5, ms(0));

        assert_eq!(s.pop_due(ms(100), 5), None);
        assert!(s.pop_due(ms(100), 6).is_some());
    }

    #[test]
    fn cancel_clears_slot_and_is_idempotent() {
        let mut s = Scheduler::new();
        let mut slot = Some(s.schedule_once(FISH, TimerAction::FlopBurst, ms(0), 0, ms(50)));

        s.cancel(&mut slot);
        assert_eq!(slot, None);
        assert_eq!(s.pending_count(), 0);

        s.cancel(&mut slot);
        assert_eq!(slot, None);
        assert_eq!(s.pop_due(ms(1_000), 9), None);
    }

    #[test]
    fn due_order_then_arming_order() {
        let mut s = Scheduler::new();
        let late  = s.schedule_once(FISH, TimerAction::Bite, ms(0), 0, ms(500));
        let first = s.schedule_once(ActorSlot::Bobber, TimerAction::Bite, ms(0), 0, ms(200));
        let tie   = s.schedule_once(ActorSlot::Line, TimerAction::Bite, ms(0), 0, ms(200));

        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(ms(1_000), 1))
            .map(|f| f.handle)
            .collect();
        assert_eq!(order, vec![first, tie, late]);
    }

    #[test]
    fn pending_counted_per_owner() {
        let mut s = Scheduler::new();
        s.schedule_once(FISH, TimerAction::ChangeDirection, ms(0), 0, ms(300));
        s.schedule_once(FISH, TimerAction::FlopBurst, ms(0), 0, ms(300));
        s.schedule_once(ActorSlot::Bobber, TimerAction::Bite, ms(0), 0, ms(300));

        assert_eq!(s.pending_for(FISH), 2);
        assert_eq!(s.pending_for(ActorSlot::Bobber), 1);
        assert_eq!(s.pending_for(ActorSlot::Fisherman), 0);
    }
}
