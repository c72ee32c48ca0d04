//! # Event bus for broadcasting race events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Publishing is
//! synchronous and never blocks, so coordinators publish directly from whatever
//! thread a source happens to emit on.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Listener (one per Amb):
//!   race #1 coordinator ──┐
//!   race #2 coordinator ──┼──► Bus ───► Monitor listener ───► SubscriberSet
//!   sequencer           ──┤  (broadcast)
//!   subscriber workers  ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` calls `broadcast::Sender::send` and returns.
//! - **Bounded capacity**: one ring buffer shared by all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are dropped when nobody listens; races do not depend on them.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for race events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// Skips the send entirely when nobody is listening.
    pub fn publish(&self, ev: Event) {
        if self.tx.receiver_count() > 0 {
            let _ = self.tx.send(ev);
        }
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns `true` when at least one receiver is attached.
    pub fn has_listeners(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::new(0);
        assert!(!bus.has_listeners());
        bus.publish(Event::new(EventKind::RaceStarted));
    }

    #[test]
    fn test_receiver_sees_published_events() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::WinnerDecided).with_candidate(1));

        let ev = rx.try_recv().expect("event should be buffered");
        assert_eq!(ev.kind, EventKind::WinnerDecided);
        assert_eq!(ev.candidate, Some(1));
    }
}
