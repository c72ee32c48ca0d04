//! # Event fan-out to race subscribers.
//!
//! Every subscriber gets a lane: a bounded queue drained by its own worker task.
//!
//! ```text
//! emit_arc(event) ─┬─► lane "tracker" ─► worker ─► on_event()
//!                  ├─► lane "log"     ─► worker ─► on_event()   (panic → SubscriberPanicked)
//!                  └─► lane "..."     ─► full: count the drop
//!                                              first drop of a burst → SubscriberOverflow
//!                                              next accepted event  → SubscriberOverflow{dropped=n}
//! ```
//!
//! ## Rules
//! - `emit_arc` never waits; lanes are independent, so subscribers see different
//!   prefixes of the stream at any moment but each one sees its events in bus order.
//! - A burst of drops on one lane is reported twice (start and recovery), not once per
//!   dropped event, so a slow subscriber cannot flood the bus during a busy race.
//! - Overflow reports are never counted or reported for overflow events themselves.
//!
//! Workers catch panics with `AssertUnwindSafe`; a subscriber that panics while
//! holding its own lock may leave that state inconsistent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::error::panic_info;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

struct Lane {
    name: &'static str,
    queue: mpsc::Sender<Arc<Event>>,
    dropped: AtomicU64,
}

impl Lane {
    /// Offers `event` to the lane; returns the overflow report to publish, if any.
    fn offer(&self, event: &Arc<Event>) -> Option<Event> {
        let counted = !event.is_subscriber_overflow();
        match self.queue.try_send(Arc::clone(event)) {
            Ok(()) => {
                let dropped = self.dropped.swap(0, Ordering::Relaxed);
                (dropped > 0).then(|| {
                    Event::subscriber_overflow(self.name, "recovered")
                        .with_reason(format!("subscriber={} dropped={dropped}", self.name))
                })
            }
            Err(_) if !counted => None,
            Err(err) => {
                let reason = match err {
                    TrySendError::Full(_) => "full",
                    TrySendError::Closed(_) => "closed",
                };
                let first = self.dropped.fetch_add(1, Ordering::Relaxed) == 0;
                first.then(|| Event::subscriber_overflow(self.name, reason))
            }
        }
    }
}

/// Fan-out of bus events to per-subscriber lanes.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the lanes and spawns one worker per subscriber.
    ///
    /// Must be called inside a tokio runtime. Queue capacity is at least 1.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, workers): (Vec<Lane>, Vec<JoinHandle<()>>) = subs
            .into_iter()
            .map(|sub| {
                let (queue, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let lane = Lane {
                    name: sub.name(),
                    queue,
                    dropped: AtomicU64::new(0),
                };
                (lane, tokio::spawn(drive(sub, rx, bus.clone())))
            })
            .unzip();
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Number of subscriber lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Emits an owned copy of `event` to every lane.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a shared event to every lane.
    pub fn emit_arc(&self, event: Arc<Event>) {
        for report in self.lanes.iter().filter_map(|lane| lane.offer(&event)) {
            self.bus.publish(report);
        }
    }

    /// Closes every lane and waits until the workers processed what was queued.
    pub async fn shutdown(self) {
        let Self { lanes, workers, .. } = self;
        drop(lanes);
        for worker in workers {
            let _ = worker.await;
        }
    }
}

/// Worker loop of one lane: runs until the lane is closed.
async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(event) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&event))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_info(payload.as_ref()),
            ));
        }
    }
}
