//! # Signal receivers.
//!
//! [`Observer`] is the receiving end of a source. The race installs one observer per
//! candidate, and the downstream consumer of a race is itself an observer.
//!
//! ## Protocol
//! ```text
//! on_producer?  (at most once, at any time before the terminal signal)
//! on_next*      (serialized; never concurrently for one observer)
//! (on_error | on_complete)?
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use racevisor::Observer;
//!
//! #[derive(Default)]
//! struct Sum(AtomicU64);
//!
//! impl Observer<u64, String> for Sum {
//!     fn on_next(&self, value: u64) {
//!         self.0.fetch_add(value, Ordering::Relaxed);
//!     }
//!     fn on_error(&self, _error: String) {}
//!     fn on_complete(&self) {}
//! }
//! ```

use std::sync::Arc;

use crate::flow::ProducerRef;

/// Receives signals from a single source (or from a race).
///
/// Implementations must be cheap and non-blocking: signals are delivered on the
/// emitting thread.
pub trait Observer<T, E>: Send + Sync + 'static {
    /// Receives the producer used to request demand.
    ///
    /// The default implementation drops it, which leaves a demand-honouring source
    /// without any demand.
    fn on_producer(&self, producer: ProducerRef) {
        let _ = producer;
    }

    /// Receives one value.
    fn on_next(&self, value: T);

    /// Receives the terminal failure.
    fn on_error(&self, error: E);

    /// Receives the terminal success.
    fn on_complete(&self);
}

/// Shared observer handle.
pub type ObserverRef<T, E> = Arc<dyn Observer<T, E>>;
