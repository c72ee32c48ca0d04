//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! built-in implementations for race events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Coordinator ── publish(Event) ──► Bus ──► Monitor ──► SubscriberSet
//!                                                           │
//!                                                 ┌─────────┼─────────┐
//!                                                 ▼         ▼         ▼
//!                                            RaceTracker LogWriter  Custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers**: observe and react to events (logging, metrics, alerts)
//! - **Stateful subscribers**: maintain state derived from events ([`RaceTracker`])

mod embedded;
mod race;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use race::{RaceStatus, RaceTracker};
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
