//! # Subscribable event sources.
//!
//! A [`Source`] is anything an [`Observer`](crate::Observer) can subscribe to. The
//! common handle type is [`SourceRef`], an `Arc<dyn Source>` suitable for sharing
//! between races.

use std::sync::Arc;

use crate::flow::{ObserverRef, SubscriptionRef};

/// Producer of signals.
///
/// `subscribe` is called synchronously by the race; it may block, emit signals
/// before returning, or hand emission to another thread.
pub trait Source<T, E>: Send + Sync + 'static {
    /// Returns a stable, human-readable source name (used in events).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Attaches `observer` and returns the handle that detaches it.
    ///
    /// # Errors
    /// Returns `Err(e)` when the source fails before registering the observer.
    /// The race treats `e` as the candidate's first signal.
    fn subscribe(&self, observer: ObserverRef<T, E>) -> Result<SubscriptionRef, E>;
}

/// Shared source handle.
pub type SourceRef<T, E> = Arc<dyn Source<T, E>>;
