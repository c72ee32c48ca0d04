//! Signal flow vocabulary: sources, observers, subscriptions, producers and demand.
//!
//! ```text
//!   Source ──subscribe(observer)──► Subscription (cancel)
//!     │
//!     ├─► observer.on_producer(Producer)   request(n) / cancel
//!     ├─► observer.on_next(T)*
//!     └─► observer.on_error(E) | observer.on_complete()
//! ```

mod demand;
mod observer;
mod signal;
mod source;
mod subscription;

pub use demand::Demand;
pub use observer::{Observer, ObserverRef};
pub use signal::{Signal, SignalKind};
pub use source::{Source, SourceRef};
pub use subscription::{Producer, ProducerRef, Subscription, SubscriptionRef};
