//! # Race events emitted by coordinators and subscriber workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Race lifecycle**: start, winner decision, finish, cancellation
//! - **Candidate events**: subscription, severance, residual discards, protocol violations
//! - **Subscriber events**: overflow, panics and listener lag of the event pipeline itself
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the race id and
//! label, the candidate index and source name, and the signal kind that triggered it.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use racevisor::{Event, EventKind, SignalKind};
//!
//! let ev = Event::new(EventKind::WinnerDecided)
//!     .with_race(7, "lookup")
//!     .with_candidate(2)
//!     .with_signal(SignalKind::Next);
//!
//! assert_eq!(ev.kind, EventKind::WinnerDecided);
//! assert_eq!(ev.race_id, Some(7));
//! assert_eq!(ev.candidate, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::flow::{Demand, SignalKind};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of race events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    /// The bus listener fell behind and skipped events.
    ///
    /// Sets:
    /// - `reason`: number of skipped events
    ListenerLagged,

    // === Race lifecycle ===
    /// A race was subscribed and is about to subscribe its candidates.
    ///
    /// Sets:
    /// - `race_id`, `race`: race identity
    /// - `reason`: number of candidates
    RaceStarted,

    /// The first signal of `candidate` decided the race.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    /// - `signal`: kind of the deciding signal
    WinnerDecided,

    /// The winner's terminal signal was relayed downstream.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    /// - `signal`: `Error` or `Complete`
    RaceFinished,

    /// The downstream cancelled the race.
    ///
    /// Sets:
    /// - `race_id`, `race`
    /// - `candidate`: winner index if the race was already decided
    RaceCancelled,

    /// Downstream granted more demand (only with `AmbConfig::demand_events`).
    ///
    /// Sets:
    /// - `race_id`, `race`
    /// - `demand`: the increment
    DemandRequested,

    // === Candidate events ===
    /// A candidate's `subscribe` call returned a subscription.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    CandidateSubscribed,

    /// A candidate's `subscribe` call failed; the failure is its first signal.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    SubscribeFailed,

    /// A candidate's subscription was cancelled.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    CandidateSevered,

    /// Cancelling a candidate failed; the failure is logged and ignored.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    /// - `reason`: failure message
    SeverFailed,

    /// A signal from a losing candidate (or after cancellation) was discarded.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    /// - `signal`: kind of the discarded signal
    ResidualDiscarded,

    /// A producer arrived for a candidate that can no longer win; it was cancelled.
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    ProducerRejected,

    /// A source broke the signal protocol (signal after terminal, second producer).
    ///
    /// Sets:
    /// - `race_id`, `race`, `candidate`, `source`
    /// - `signal`: kind of the offending signal, when applicable
    /// - `reason`: short description
    ProtocolViolation,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
            EventKind::ListenerLagged => "listener_lagged",
            EventKind::RaceStarted => "race_started",
            EventKind::WinnerDecided => "winner_decided",
            EventKind::RaceFinished => "race_finished",
            EventKind::RaceCancelled => "race_cancelled",
            EventKind::DemandRequested => "demand_requested",
            EventKind::CandidateSubscribed => "candidate_subscribed",
            EventKind::SubscribeFailed => "subscribe_failed",
            EventKind::CandidateSevered => "candidate_severed",
            EventKind::SeverFailed => "sever_failed",
            EventKind::ResidualDiscarded => "residual_discarded",
            EventKind::ProducerRejected => "producer_rejected",
            EventKind::ProtocolViolation => "protocol_violation",
        }
    }
}

/// Race event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Identity of the race instance (one per `Amb::subscribe`).
    pub race_id: Option<u64>,
    /// Human-readable race label.
    pub race: Option<Arc<str>>,
    /// Candidate index within the race.
    pub candidate: Option<usize>,
    /// Name of the candidate's source.
    pub source: Option<Arc<str>>,
    /// Kind of the signal that triggered the event.
    pub signal: Option<SignalKind>,
    /// Demand increment.
    pub demand: Option<Demand>,
    /// Name of the event subscriber (subscriber events only).
    pub subscriber: Option<&'static str>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            race_id: None,
            race: None,
            candidate: None,
            source: None,
            signal: None,
            demand: None,
            subscriber: None,
            reason: None,
        }
    }

    /// Attaches the race identity.
    #[inline]
    pub fn with_race(mut self, id: u64, label: impl Into<Arc<str>>) -> Self {
        self.race_id = Some(id);
        self.race = Some(label.into());
        self
    }

    /// Attaches a candidate index.
    #[inline]
    pub fn with_candidate(mut self, index: usize) -> Self {
        self.candidate = Some(index);
        self
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches the triggering signal kind.
    #[inline]
    pub fn with_signal(mut self, signal: SignalKind) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Attaches a demand increment.
    #[inline]
    pub fn with_demand(mut self, demand: Demand) -> Self {
        self.demand = Some(demand);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"));
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Returns `true` for kinds that end a race (finished or cancelled).
    #[inline]
    pub fn is_race_end(&self) -> bool {
        matches!(self.kind, EventKind::RaceFinished | EventKind::RaceCancelled)
    }
}
