//! # Signals delivered by a source.
//!
//! A source emits zero or more [`Signal::Next`] values followed by at most one
//! terminal signal ([`Signal::Error`] or [`Signal::Complete`]).

/// One signal emitted by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<T, E> {
    /// A value.
    Next(T),
    /// Terminal failure.
    Error(E),
    /// Terminal success.
    Complete,
}

impl<T, E> Signal<T, E> {
    /// Returns the payload-free classification of this signal.
    #[inline]
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Next(_) => SignalKind::Next,
            Signal::Error(_) => SignalKind::Error,
            Signal::Complete => SignalKind::Complete,
        }
    }

    /// Returns `true` for [`Signal::Error`] and [`Signal::Complete`].
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }
}

/// Payload-free classification of a [`Signal`], carried by race events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Next,
    Error,
    Complete,
}

impl SignalKind {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SignalKind::Next)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            SignalKind::Next => "next",
            SignalKind::Error => "error",
            SignalKind::Complete => "complete",
        }
    }
}
