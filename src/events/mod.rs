//! Race events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to publish race
//! lifecycle events emitted by coordinators, the subscription sequencer and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: race coordinators, the subscription sequencer, `SubscriberSet`
//!   workers (overflow/panic) and the monitor listener (lag).
//! - **Consumers**: the monitor listener of an `Amb`, which fans out to its
//!   `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
