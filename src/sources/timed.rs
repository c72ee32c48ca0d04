//! # Timed: cold source replaying a schedule on the Tokio timer
//!
//! Every subscription spawns a task that walks the schedule; each entry is an offset
//! from the moment of subscription and the signal to emit then. The task stops after
//! the first terminal entry or when the subscription (a `CancellationToken`) is
//! cancelled.
//!
//! ```text
//! subscribe(obs) ──► spawn ──► for (at, signal) in schedule:
//!                                 select! { token.cancelled() => stop,
//!                                           sleep_until(t0 + at) => emit(signal) }
//! ```
//!
//! # Panics
//! Subscribing outside of a Tokio runtime panics (`tokio::spawn`).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::flow::{ObserverRef, Signal, Source, SubscriptionRef};

/// Source emitting a fixed schedule of delayed signals.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use racevisor::Timed;
///
/// let replica = Timed::<&str, String>::named("replica-b")
///     .next(Duration::from_millis(20), "row")
///     .complete(Duration::from_millis(25));
/// ```
#[derive(Clone)]
pub struct Timed<T, E> {
    name: Arc<str>,
    schedule: Vec<(Duration, Signal<T, E>)>,
}

impl<T, E> Timed<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            schedule: Vec::new(),
        }
    }

    /// Emits `values` one per `interval`, the first after one interval.
    pub fn every(
        name: impl Into<Arc<str>>,
        interval: Duration,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let mut timed = Self::named(name);
        for (i, value) in values.into_iter().enumerate() {
            let at = interval.saturating_mul(u32::try_from(i + 1).unwrap_or(u32::MAX));
            timed = timed.next(at, value);
        }
        timed
    }

    /// Schedules a value `at` after subscription.
    pub fn next(self, at: Duration, value: T) -> Self {
        self.push(at, Signal::Next(value))
    }

    /// Schedules a failure `at` after subscription.
    pub fn error(self, at: Duration, error: E) -> Self {
        self.push(at, Signal::Error(error))
    }

    /// Schedules completion `at` after subscription.
    pub fn complete(self, at: Duration) -> Self {
        self.push(at, Signal::Complete)
    }

    fn push(mut self, at: Duration, signal: Signal<T, E>) -> Self {
        // Entries are kept sorted; equal offsets keep insertion order.
        let pos = self.schedule.partition_point(|(other, _)| *other <= at);
        self.schedule.insert(pos, (at, signal));
        self
    }
}

impl<T, E> Source<T, E> for Timed<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, observer: ObserverRef<T, E>) -> Result<SubscriptionRef, E> {
        let token = CancellationToken::new();
        let stop = token.clone();
        let schedule = self.schedule.clone();
        let started = Instant::now();

        tokio::spawn(async move {
            for (at, signal) in schedule {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => return,
                    _ = sleep_until(started + at) => {}
                }
                if stop.is_cancelled() {
                    return;
                }
                match signal {
                    Signal::Next(value) => observer.on_next(value),
                    Signal::Error(error) => {
                        observer.on_error(error);
                        return;
                    }
                    Signal::Complete => {
                        observer.on_complete();
                        return;
                    }
                }
            }
        });

        Ok(Box::new(token))
    }
}
