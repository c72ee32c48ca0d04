//! # Recorder: a recording downstream observer
//!
//! [`Recorder`] stores everything it receives and manages demand on behalf of its
//! owner:
//!
//! - the initial demand (default [`Demand::UNBOUNDED`]) is requested as soon as the
//!   producer arrives;
//! - [`Recorder::request`] before the producer arrived is accumulated and requested
//!   together with the initial demand;
//! - [`Recorder::await_terminal`] waits for the terminal signal on a `watch` channel.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::flow::{Demand, Observer, ProducerRef};

struct RecorderState<T, E> {
    values: Vec<T>,
    errors: Vec<E>,
    completions: usize,
    producer: Option<ProducerRef>,
    pending: Demand,
}

/// Downstream observer that records values, errors and completions.
pub struct Recorder<T, E> {
    state: Mutex<RecorderState<T, E>>,
    terminated: watch::Sender<bool>,
}

impl<T, E> Recorder<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Records with unbounded demand.
    pub fn new() -> Self {
        Self::with_demand(Demand::UNBOUNDED)
    }

    /// Records with `initial` demand requested when the producer arrives.
    pub fn with_demand(initial: impl Into<Demand>) -> Self {
        let (terminated, _) = watch::channel(false);
        Self {
            state: Mutex::new(RecorderState {
                values: Vec::new(),
                errors: Vec::new(),
                completions: 0,
                producer: None,
                pending: initial.into(),
            }),
            terminated,
        }
    }

    /// Requests `n` more values, or remembers them until the producer arrives.
    pub fn request(&self, n: impl Into<Demand>) {
        let n = n.into();
        let producer = {
            let mut st = self.state.lock();
            match &st.producer {
                Some(p) => p.clone(),
                None => {
                    st.pending = st.pending.saturating_add(n);
                    return;
                }
            }
        };
        producer.request(n);
    }

    /// Cancels the upstream, if a producer was received.
    pub fn cancel(&self) {
        let producer = self.state.lock().producer.clone();
        if let Some(p) = producer {
            p.cancel();
        }
    }

    pub fn values(&self) -> Vec<T> {
        self.state.lock().values.clone()
    }

    pub fn errors(&self) -> Vec<E> {
        self.state.lock().errors.clone()
    }

    pub fn completions(&self) -> usize {
        self.state.lock().completions
    }

    /// `true` once an error or completion was received.
    pub fn is_terminated(&self) -> bool {
        *self.terminated.borrow()
    }

    /// Waits up to `timeout` for a terminal signal; returns whether one arrived.
    pub async fn await_terminal(&self, timeout: Duration) -> bool {
        let mut rx = self.terminated.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|done| *done))
            .await
            .is_ok_and(|res| res.is_ok())
    }

    fn mark_terminated(&self) {
        self.terminated.send_replace(true);
    }
}

impl<T, E> Default for Recorder<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Observer<T, E> for Recorder<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn on_producer(&self, producer: ProducerRef) {
        let pending = {
            let mut st = self.state.lock();
            st.producer = Some(producer.clone());
            std::mem::replace(&mut st.pending, Demand::ZERO)
        };
        if !pending.is_zero() {
            producer.request(pending);
        }
    }

    fn on_next(&self, value: T) {
        self.state.lock().values.push(value);
    }

    fn on_error(&self, error: E) {
        self.state.lock().errors.push(error);
        self.mark_terminated();
    }

    fn on_complete(&self) {
        self.state.lock().completions += 1;
        self.mark_terminated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Counting(AtomicU64);

    impl crate::flow::Producer for Counting {
        fn request(&self, n: Demand) {
            self.0.fetch_add(n.get(), Ordering::SeqCst);
        }
        fn cancel(&self) {}
    }

    #[test]
    fn test_deferred_request_is_merged() {
        let rec = Recorder::<u32, ()>::with_demand(2u64);
        rec.request(3u64);
        let p = Arc::new(Counting::default());
        rec.on_producer(p.clone());
        assert_eq!(p.0.load(Ordering::SeqCst), 5);

        rec.request(1u64);
        assert_eq!(p.0.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_await_terminal() {
        let rec = Recorder::<u32, ()>::new();
        assert!(!rec.await_terminal(Duration::from_millis(5)).await);
        rec.on_next(1);
        rec.on_complete();
        assert!(rec.is_terminated());
        assert!(rec.await_terminal(Duration::from_millis(5)).await);
        assert_eq!(rec.values(), vec![1]);
    }
}
