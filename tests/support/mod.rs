//! Test sources with full visibility into what a race did to them.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use racevisor::{
    Demand, ObserverRef, Producer, SeverError, Source, SourceRef, Subscription, SubscriptionRef,
};

pub type Obs = ObserverRef<u32, String>;
pub type Src = SourceRef<u32, String>;

/// Producer side of a [`Probe`].
#[derive(Default)]
pub struct ProbeProducer {
    pub requested: AtomicU64,
    pub requests: AtomicUsize,
    pub cancelled: AtomicBool,
}

impl Producer for ProbeProducer {
    fn request(&self, n: Demand) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .requested
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                Some(Demand::new(cur).saturating_add(n).get())
            });
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct ProbeState {
    observer: Option<Obs>,
}

/// Manually driven source recording subscriptions, demand and cancellation.
pub struct Probe {
    name: String,
    with_producer: bool,
    pub subscriptions: AtomicUsize,
    pub cancels: Arc<AtomicUsize>,
    pub producer: Arc<ProbeProducer>,
    state: Mutex<ProbeState>,
}

impl Probe {
    /// Probe that hands a producer to its observer during `subscribe`.
    pub fn new(name: &str) -> Arc<Self> {
        Self::build(name, true)
    }

    /// Probe that ignores demand (no producer during `subscribe`).
    pub fn hot(name: &str) -> Arc<Self> {
        Self::build(name, false)
    }

    fn build(name: &str, with_producer: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            with_producer,
            subscriptions: AtomicUsize::new(0),
            cancels: Arc::new(AtomicUsize::new(0)),
            producer: Arc::new(ProbeProducer::default()),
            state: Mutex::new(ProbeState::default()),
        })
    }

    pub fn src(self: &Arc<Self>) -> Src {
        self.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.load(Ordering::SeqCst) > 0
    }

    /// `true` once the race cancelled this probe through its subscription or producer.
    pub fn is_cancelled(&self) -> bool {
        self.cancels.load(Ordering::SeqCst) > 0 || self.producer.cancelled.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> u64 {
        self.producer.requested.load(Ordering::SeqCst)
    }

    fn observer(&self) -> Obs {
        self.state
            .lock()
            .observer
            .clone()
            .expect("probe was never subscribed")
    }

    pub fn next(&self, value: u32) {
        self.observer().on_next(value);
    }

    pub fn error(&self, error: &str) {
        self.observer().on_error(error.to_string());
    }

    pub fn complete(&self) {
        self.observer().on_complete();
    }

    /// Hands the producer over after `subscribe` returned.
    pub fn attach_producer_late(&self) {
        self.observer().on_producer(self.producer.clone());
    }
}

struct ProbeSubscription(Arc<AtomicUsize>);

impl Subscription for ProbeSubscription {
    fn cancel(&self) -> Result<(), SeverError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Source<u32, String> for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, observer: Obs) -> Result<SubscriptionRef, String> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.state.lock().observer = Some(observer.clone());
        if self.with_producer {
            observer.on_producer(self.producer.clone());
        }
        Ok(Box::new(ProbeSubscription(self.cancels.clone())))
    }
}

pub fn sources(probes: &[Arc<Probe>]) -> Vec<Src> {
    probes.iter().map(Probe::src).collect()
}
