//! # Function-backed source (`SourceFn`)
//!
//! [`SourceFn`] wraps a closure `F: Fn(ObserverRef<T, E>) -> Result<SubscriptionRef, E>`,
//! invoked once per subscription. Use it for ad-hoc candidates in tests or to adapt
//! callback-based APIs.
//!
//! ## Example
//! ```rust
//! use racevisor::{ObserverRef, SourceFn, SourceRef};
//! use tokio_util::sync::CancellationToken;
//!
//! let s: SourceRef<u32, String> = SourceFn::arc("cached", |observer: ObserverRef<u32, String>| {
//!     observer.on_next(42);
//!     observer.on_complete();
//!     Ok(Box::new(CancellationToken::new()))
//! });
//! assert_eq!(s.name(), "cached");
//! ```

use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::flow::{ObserverRef, Source, SubscriptionRef};

/// Closure-backed source.
pub struct SourceFn<F, T, E> {
    name: Cow<'static, str>,
    f: F,
    _signal: PhantomData<fn() -> (T, E)>,
}

impl<F, T, E> SourceFn<F, T, E>
where
    F: Fn(ObserverRef<T, E>) -> Result<SubscriptionRef, E>,
{
    /// Creates a new function-backed source.
    ///
    /// Prefer [`SourceFn::arc`] when you immediately need a [`SourceRef`](crate::SourceRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _signal: PhantomData,
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, T, E> Source<T, E> for SourceFn<F, T, E>
where
    F: Fn(ObserverRef<T, E>) -> Result<SubscriptionRef, E> + Send + Sync + 'static,
    T: 'static,
    E: 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self, observer: ObserverRef<T, E>) -> Result<SubscriptionRef, E> {
        (self.f)(observer)
    }
}
