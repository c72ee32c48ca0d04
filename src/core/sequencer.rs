//! # Subscription sequencer.
//!
//! Subscribes the candidates of one race in declared order, on the calling thread:
//!
//! ```text
//! for i in 0..N:
//!   ├─ race settled (decided / cancelled)? ─► stop; later sources could only lose
//!   ├─ source[i].subscribe(CandidateObserver(i))      (may block, may emit inline)
//!   │     ├─ Ok(subscription) ─► CandidateSubscribed, attach to slot i
//!   │     └─ Err(e)           ─► SubscribeFailed, Signal::Error(e) as i's first signal
//!   └─ next
//! ```
//!
//! Source `i + 1` is never subscribed before `subscribe` of source `i` has returned.
//! No thread is spawned here; any parallelism comes from the sources themselves.

use std::sync::Arc;

use crate::core::candidate::CandidateObserver;
use crate::core::coordinator::Coordinator;
use crate::events::EventKind;
use crate::flow::{ObserverRef, Signal, SourceRef};

pub(crate) fn subscribe_all<T, E>(coordinator: &Arc<Coordinator<T, E>>, sources: &[SourceRef<T, E>])
where
    T: Send + 'static,
    E: Send + 'static,
{
    for (index, source) in sources.iter().enumerate() {
        if coordinator.is_settled() {
            break;
        }

        let observer: ObserverRef<T, E> =
            Arc::new(CandidateObserver::new(Arc::clone(coordinator), index));

        match source.subscribe(observer) {
            Ok(subscription) => {
                coordinator.publish_candidate(EventKind::CandidateSubscribed, index);
                coordinator.attach_subscription(index, subscription);
            }
            Err(error) => {
                coordinator.publish_candidate(EventKind::SubscribeFailed, index);
                coordinator.on_signal(index, Signal::Error(error));
            }
        }
    }
}
