//! # Cancellation and flow-control handles.
//!
//! - [`Subscription`] is returned by [`Source::subscribe`](crate::Source::subscribe)
//!   and detaches the observer from the source.
//! - [`Producer`] is handed to an observer by a source that honours pull-based
//!   [`Demand`]; the observer calls [`Producer::request`] to receive more values.
//!
//! Both `cancel` operations must be idempotent and safe to call after the source
//! has already terminated.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::SeverError;
use crate::flow::Demand;

/// Cancellable handle returned by subscribing to a source.
pub trait Subscription: Send + Sync + 'static {
    /// Detaches the observer from the source.
    ///
    /// Idempotent. A returned error is reported by the race as an event and
    /// otherwise ignored.
    fn cancel(&self) -> Result<(), SeverError>;
}

/// Owned subscription handle.
pub type SubscriptionRef = Box<dyn Subscription>;

/// Demand-honouring side of a source.
pub trait Producer: Send + Sync + 'static {
    /// Grants `n` more values. Calls are additive; [`Demand::UNBOUNDED`] lifts the limit.
    fn request(&self, n: Demand);

    /// Stops emission. Idempotent.
    fn cancel(&self);
}

/// Shared producer handle.
pub type ProducerRef = Arc<dyn Producer>;

impl Subscription for CancellationToken {
    fn cancel(&self) -> Result<(), SeverError> {
        CancellationToken::cancel(self);
        Ok(())
    }
}
