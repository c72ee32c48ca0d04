//! # Amb: first-to-respond race over a fixed list of sources.
//!
//! An [`Amb`] is a reusable race definition. Every call to [`Amb::race`] (or to
//! [`Source::subscribe`], since `Amb` is itself a source) starts an independent race
//! instance with its own coordinator and id.
//!
//! ```text
//! Amb::race(downstream)
//!   ├─ Coordinator::new (one slot per source, race id from RACE_SEQ)
//!   ├─ publish RaceStarted
//!   ├─ downstream.on_producer(RaceHandle)     ◄── downstream may request here
//!   ├─ subscribe_all(sources)                 ◄── in order, stops once settled
//!   └─ return RaceHandle
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::core::builder::AmbBuilder;
use crate::core::config::AmbConfig;
use crate::core::coordinator::Coordinator;
use crate::core::handle::RaceHandle;
use crate::core::monitor::Monitor;
use crate::core::sequencer::subscribe_all;
use crate::error::RaceError;
use crate::events::Bus;
use crate::flow::{ObserverRef, Source, SourceRef, SubscriptionRef};
use crate::subscribers::Subscribe;

/// Race id counter shared by every `Amb`.
static RACE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Race definition: mirrors whichever source signals first.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use racevisor::{Amb, Recorder, SourceRef, Subject};
///
/// let slow = Arc::new(Subject::<&str, ()>::named("slow"));
/// let fast = Arc::new(Subject::<&str, ()>::named("fast"));
/// let amb = Amb::new([slow.clone() as SourceRef<&str, ()>, fast.clone()]).unwrap();
///
/// let rec = Arc::new(Recorder::<&str, ()>::new());
/// let handle = amb.race(rec.clone());
///
/// fast.next("pong");
/// slow.next("late");
/// fast.complete();
///
/// assert_eq!(handle.winner(), Some(1));
/// assert_eq!(rec.values(), vec!["pong"]);
/// assert_eq!(rec.completions(), 1);
/// assert!(!slow.has_observers());
/// ```
pub struct Amb<T, E> {
    name: Arc<str>,
    sources: Arc<[SourceRef<T, E>]>,
    names: Arc<[Arc<str>]>,
    cfg: AmbConfig,
    bus: Bus,
    monitor: Mutex<Option<Monitor>>,
}

impl<T, E> Amb<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Creates a race over `sources` with the default configuration.
    ///
    /// # Errors
    /// [`RaceError::NoSources`] if `sources` is empty.
    pub fn new(sources: impl IntoIterator<Item = SourceRef<T, E>>) -> Result<Self, RaceError> {
        AmbBuilder::new(AmbConfig::default())
            .sources(sources)
            .build()
    }

    /// Returns a builder for a configured race.
    pub fn builder(cfg: AmbConfig) -> AmbBuilder<T, E> {
        AmbBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        name: Arc<str>,
        sources: Vec<SourceRef<T, E>>,
        cfg: AmbConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let names: Arc<[Arc<str>]> = sources.iter().map(|s| Arc::from(s.name())).collect();
        let monitor = (!subscribers.is_empty()).then(|| Monitor::spawn(&bus, subscribers));
        Self {
            name,
            sources: sources.into(),
            names,
            cfg,
            bus,
            monitor: Mutex::new(monitor),
        }
    }

    /// Race label carried by every event.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Always `false`: an `Amb` cannot be built without sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Candidate names in subscription order.
    pub fn source_names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Event bus of this race definition.
    ///
    /// Subscribe to it to receive raw [`Event`](crate::Event)s of every race
    /// instance; events are only built while somebody listens.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Starts a new race instance delivering to `downstream`.
    ///
    /// The downstream receives the returned handle through
    /// [`Observer::on_producer`](crate::Observer::on_producer) before the first
    /// source is subscribed, so demand requested there reaches every candidate.
    /// Sources are subscribed on the calling thread, in order; subscription stops
    /// early once the race is decided or cancelled.
    pub fn race(&self, downstream: ObserverRef<T, E>) -> RaceHandle<T, E> {
        let id = RACE_SEQ.fetch_add(1, Ordering::Relaxed);
        let coordinator = Arc::new(Coordinator::new(
            id,
            Arc::clone(&self.name),
            &self.names,
            Arc::clone(&downstream),
            self.bus.clone(),
            self.cfg.demand_events,
        ));
        let handle = RaceHandle::new(Arc::clone(&coordinator));

        coordinator.publish_started();
        downstream.on_producer(Arc::new(handle.clone()));
        subscribe_all(&coordinator, &self.sources);
        handle
    }

    /// Stops the subscriber pipeline after delivering buffered events.
    ///
    /// Races keep working afterwards; their events are no longer forwarded to
    /// subscribers. No-op without subscribers or when called twice.
    pub async fn shutdown(&self) {
        let monitor = self.monitor.lock().take();
        if let Some(monitor) = monitor {
            monitor.shutdown().await;
        }
    }
}

impl<T, E> Source<T, E> for Amb<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, observer: ObserverRef<T, E>) -> Result<SubscriptionRef, E> {
        Ok(Box::new(self.race(observer)))
    }
}
