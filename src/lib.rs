//! # racevisor
//!
//! **Racevisor** is a first-to-respond ("amb") race coordinator.
//!
//! Given an ordered list of candidate sources, a race mirrors whichever candidate
//! emits first (a value, an error or a completion) and cancels all the others. It is
//! the building block for hedged requests, replica reads and fallback chains:
//! subscribe to several equivalent sources, keep the fastest, drop the rest.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Source 0   │   │   Source 1   │   │   Source 2   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ CandidateObserver│(index tagged)    │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator (one per race instance)                              │
//! │  - WinnerCell (single CAS decides the winner)                     │
//! │  - CandidateSlot per source (subscription, producer, demand)      │
//! │  - DemandLedger (downstream demand, fanned out until decided)     │
//! └──────┬───────────────────────────────────────────────────┬────────┘
//!        ▼                                                   │ publish
//!   downstream Observer  ◄── RaceHandle (request / cancel)   ▼
//!                                              ┌─────────────────────────┐
//!                                              │ Bus (broadcast channel) │
//!                                              └────────────┬────────────┘
//!                                                           ▼
//!                                            Monitor ──► SubscriberSet
//!                                                      ┌──────┼──────┐
//!                                                      ▼      ▼      ▼
//!                                              RaceTracker LogWriter custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Amb::race(downstream)
//!   ├─► publish RaceStarted
//!   ├─► downstream.on_producer(RaceHandle)
//!   ├─► subscribe sources in order (stop once decided or cancelled)
//!   │
//!   ├─ first signal from candidate i ──► claim(i)
//!   │      ├─► sever every other candidate (cancel producer + subscription)
//!   │      ├─► publish WinnerDecided
//!   │      └─► relay the signal
//!   │
//!   ├─ later signals from i  ──► relay (terminal: exactly once, RaceFinished)
//!   ├─ signals from losers   ──► discard (ResidualDiscarded)
//!   └─ RaceHandle::cancel()  ──► sever all (undecided) or the winner (decided)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                                 |
//! |-------------------|---------------------------------------------------------------|----------------------------------------------------|
//! | **Race**          | Race definition, builder and per-instance handle.             | [`Amb`], [`AmbBuilder`], [`RaceHandle`]            |
//! | **Signal flow**   | Sources, observers, subscriptions, producers and demand.      | [`Source`], [`Observer`], [`Producer`], [`Demand`] |
//! | **Sources**       | Reference sources for tests and adapters.                     | [`Subject`], [`Range`], [`Timed`], [`SourceFn`]    |
//! | **Consumers**     | Recording downstream with demand control.                     | [`Recorder`]                                       |
//! | **Subscriber API**| Hook into race events (logging, metrics, custom subscribers). | [`Subscribe`], [`RaceTracker`]                     |
//! | **Errors**        | Typed errors for race construction and severance.             | [`RaceError`], [`SeverError`]                      |
//! | **Configuration** | Race settings.                                                | [`AmbConfig`]                                      |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber (`tracing` output).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use racevisor::{Amb, AmbConfig, RaceTracker, Recorder, SourceRef, Subscribe, Timed};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let primary: SourceRef<&str, String> = Arc::new(
//!         Timed::named("primary")
//!             .next(Duration::from_millis(30), "primary-row")
//!             .complete(Duration::from_millis(31)),
//!     );
//!     let replica: SourceRef<&str, String> = Arc::new(
//!         Timed::named("replica")
//!             .next(Duration::from_millis(5), "replica-row")
//!             .complete(Duration::from_millis(6)),
//!     );
//!
//!     let tracker = Arc::new(RaceTracker::new());
//!     let amb = Amb::builder(AmbConfig::default())
//!         .named("lookup")
//!         .sources([primary, replica])
//!         .with_subscribers(vec![tracker.clone() as Arc<dyn Subscribe>])
//!         .build()?;
//!
//!     let rec = Arc::new(Recorder::<&str, String>::new());
//!     let handle = amb.race(rec.clone());
//!     assert!(rec.await_terminal(Duration::from_secs(1)).await);
//!
//!     assert_eq!(handle.winner(), Some(1));
//!     assert_eq!(rec.values(), vec!["replica-row"]);
//!
//!     amb.shutdown().await;
//!     assert_eq!(tracker.winner_of(handle.race_id()).await, Some(1));
//!     Ok(())
//! }
//! ```
mod consumers;
mod core;
mod error;
mod events;
mod flow;
mod sources;
mod subscribers;

// ---- Public re-exports ----

pub use consumers::Recorder;
pub use crate::core::{Amb, AmbBuilder, AmbConfig, RaceHandle};
pub use error::{RaceError, SeverError};
pub use events::{Bus, Event, EventKind};
pub use flow::{
    Demand, Observer, ObserverRef, Producer, ProducerRef, Signal, SignalKind, Source, SourceRef,
    Subscription, SubscriptionRef,
};
pub use sources::{Range, SourceFn, Subject, Timed};
pub use subscribers::{RaceStatus, RaceTracker, Subscribe, SubscriberSet};

// Optional: expose the built-in `tracing` subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
