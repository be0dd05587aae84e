//! The event bus: subscription table for the fixed event vocabulary.
//!
//! RULE: Subscriptions are append-only. Actors subscribe during setup
//! and never unsubscribe.
//!
//! ORDERING GUARANTEE (enforced by `SimEngine::publish`):
//!   - Publishing an event invokes every subscriber registered for it,
//!     synchronously, in subscription order.
//!   - Events a subscriber publishes are dispatched, depth-first, as soon
//!     as that subscriber's handler returns and before the next subscriber
//!     of the outer event runs.
//!   - Nesting deeper than MAX_PUBLISH_DEPTH is an error.

use std::collections::HashMap;

use crate::{event::SimEvent, types::ActorSlot};

/// Nested publishes allowed below a root publish.
pub const MAX_PUBLISH_DEPTH: usize = 16;

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: HashMap<SimEvent, Vec<ActorSlot>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` for every future publish of `event`.
    /// Subscribing the same actor twice delivers the event twice.
    pub fn subscribe(&mut self, event: SimEvent, subscriber: ActorSlot) {
        log::debug!("bus: {} subscribed to {}", subscriber.name(), event.name());
        self.subscribers.entry(event).or_default().push(subscriber);
    }

    /// Subscribers for `event`, in registration order. Empty if none.
    pub fn subscribers(&self, event: SimEvent) -> &[ActorSlot] {
        self.subscribers.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_keep_registration_order() {
        let mut bus = EventBus::new();
        bus.subscribe(SimEvent::FishCaught, ActorSlot::Custom(2));
        bus.subscribe(SimEvent::FishCaught, ActorSlot::Custom(0));
        bus.subscribe(SimEvent::FishCaught, ActorSlot::Custom(1));

        assert_eq!(
            bus.subscribers(SimEvent::FishCaught),
            &[ActorSlot::Custom(2), ActorSlot::Custom(0), ActorSlot::Custom(1)]
        );
    }

    #[test]
    fn unknown_event_has_no_subscribers() {
        let bus = EventBus::new();
        assert!(bus.subscribers(SimEvent::Reset).is_empty());
        assert_eq!(bus.subscriber_count(), 0);
    }
}
