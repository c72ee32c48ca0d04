//! # Candidate observer: the inlet a source talks to.
//!
//! Each candidate gets its own [`CandidateObserver`], which tags every signal with the
//! candidate's index and forwards it to the coordinator. It makes no decision itself.

use std::sync::Arc;

use crate::core::coordinator::Coordinator;
use crate::flow::{Observer, ProducerRef, Signal};

pub(crate) struct CandidateObserver<T, E> {
    coordinator: Arc<Coordinator<T, E>>,
    index: usize,
}

impl<T, E> CandidateObserver<T, E> {
    pub(crate) fn new(coordinator: Arc<Coordinator<T, E>>, index: usize) -> Self {
        Self { coordinator, index }
    }
}

impl<T, E> Observer<T, E> for CandidateObserver<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn on_producer(&self, producer: ProducerRef) {
        self.coordinator.attach_producer(self.index, producer);
    }

    fn on_next(&self, value: T) {
        self.coordinator.on_signal(self.index, Signal::Next(value));
    }

    fn on_error(&self, error: E) {
        self.coordinator.on_signal(self.index, Signal::Error(error));
    }

    fn on_complete(&self) {
        self.coordinator.on_signal(self.index, Signal::Complete);
    }
}
