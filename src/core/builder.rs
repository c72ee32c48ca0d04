use std::sync::Arc;

use crate::core::{Amb, AmbConfig};
use crate::error::RaceError;
use crate::flow::SourceRef;
use crate::subscribers::Subscribe;

/// Builder for an [`Amb`] with optional name and event subscribers.
pub struct AmbBuilder<T, E> {
    cfg: AmbConfig,
    name: Option<Arc<str>>,
    sources: Vec<SourceRef<T, E>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl<T, E> AmbBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: AmbConfig) -> Self {
        Self {
            cfg,
            name: None,
            sources: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Sets the race label carried by every event (defaults to `"amb"`).
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends one candidate. Candidates are subscribed in insertion order.
    pub fn source(mut self, source: SourceRef<T, E>) -> Self {
        self.sources.push(source);
        self
    }

    /// Appends several candidates, preserving iteration order.
    pub fn sources(mut self, sources: impl IntoIterator<Item = SourceRef<T, E>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive race events through dedicated workers with bounded
    /// queues; they need a running Tokio runtime at [`build`](Self::build) time.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the [`Amb`].
    ///
    /// # Errors
    /// - [`RaceError::NoSources`] if no candidate was added.
    /// - [`RaceError::NoRuntime`] if subscribers were set outside a Tokio runtime.
    pub fn build(self) -> Result<Amb<T, E>, RaceError> {
        if self.sources.is_empty() {
            return Err(RaceError::NoSources);
        }
        if !self.subscribers.is_empty() && tokio::runtime::Handle::try_current().is_err() {
            return Err(RaceError::NoRuntime);
        }
        let name = self.name.unwrap_or_else(|| Arc::from("amb"));
        Ok(Amb::new_internal(
            name,
            self.sources,
            self.cfg,
            self.subscribers,
        ))
    }
}
