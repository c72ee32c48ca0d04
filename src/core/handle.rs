//! # Race handle: the downstream's side of a race.
//!
//! [`RaceHandle`] is handed to the downstream observer through
//! [`Observer::on_producer`](crate::Observer::on_producer) before any candidate is
//! subscribed, and returned from [`Amb::race`](crate::Amb::race). It is both a
//! [`Producer`] (demand, cancellation) and a [`Subscription`].

use std::fmt;
use std::sync::Arc;

use crate::core::coordinator::Coordinator;
use crate::core::winner::Decision;
use crate::error::SeverError;
use crate::flow::{Demand, Producer, Subscription};

/// Downstream handle of one race instance.
pub struct RaceHandle<T, E> {
    coordinator: Arc<Coordinator<T, E>>,
}

impl<T, E> Clone for RaceHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl<T, E> RaceHandle<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(coordinator: Arc<Coordinator<T, E>>) -> Self {
        Self { coordinator }
    }

    /// Unique id of this race instance (matches `Event::race_id`).
    pub fn race_id(&self) -> u64 {
        self.coordinator.id()
    }

    /// Number of candidates.
    pub fn candidates(&self) -> usize {
        self.coordinator.len()
    }

    /// Grants `n` more values.
    ///
    /// Before the decision every candidate is offered the full amount; afterwards only
    /// the winner. Zero is a no-op, and so is any request after finish or cancel.
    pub fn request(&self, n: impl Into<Demand>) {
        self.coordinator.request(n.into());
    }

    /// Cancels the race: every candidate if undecided, the winner otherwise. Idempotent.
    pub fn cancel(&self) {
        self.coordinator.cancel();
    }

    /// Index of the winning candidate, once decided.
    pub fn winner(&self) -> Option<usize> {
        match self.coordinator.decision() {
            Decision::Winner(index) => Some(index),
            Decision::Undecided | Decision::Cancelled => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner().is_some()
    }

    /// `true` once the downstream cancelled (before or after the decision).
    pub fn is_cancelled(&self) -> bool {
        self.coordinator.is_cancelled()
    }

    /// `true` once the winner's terminal signal was delivered.
    pub fn is_finished(&self) -> bool {
        self.coordinator.is_finished()
    }

    /// Demand granted by the downstream and not yet delivered.
    pub fn outstanding(&self) -> Demand {
        self.coordinator.outstanding()
    }
}

impl<T, E> Producer for RaceHandle<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn request(&self, n: Demand) {
        RaceHandle::request(self, n);
    }

    fn cancel(&self) {
        RaceHandle::cancel(self);
    }
}

impl<T, E> Subscription for RaceHandle<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn cancel(&self) -> Result<(), SeverError> {
        RaceHandle::cancel(self);
        Ok(())
    }
}

impl<T, E> fmt::Debug for RaceHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RaceHandle")
            .field("race_id", &self.coordinator.id())
            .finish_non_exhaustive()
    }
}
