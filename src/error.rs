//! Error types used by the race machinery.
//!
//! This module defines two error enums:
//!
//! - [`RaceError`]: errors raised while building or running a race.
//! - [`SeverError`]: failures while cancelling a candidate's subscription.
//!
//! Errors produced by sources (`E` in `Source<T, E>`) are never wrapped: the
//! downstream observer receives the winner's error verbatim.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced by the race machinery.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaceError {
    /// A race needs at least one candidate.
    #[error("race requires at least one source")]
    NoSources,

    /// Event subscribers were configured outside of a Tokio runtime.
    #[error("event subscribers require a running tokio runtime")]
    NoRuntime,
}

impl RaceError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use racevisor::RaceError;
    ///
    /// assert_eq!(RaceError::NoSources.as_label(), "race_no_sources");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RaceError::NoSources => "race_no_sources",
            RaceError::NoRuntime => "race_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RaceError::NoSources => "no sources to race".to_string(),
            RaceError::NoRuntime => "subscriber workers need a tokio runtime".to_string(),
        }
    }
}

/// # Failures while severing a candidate.
///
/// Severance is best-effort: these errors are published as
/// `EventKind::SeverFailed` and never reach the downstream observer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeverError {
    /// The subscription reported that it could not be cancelled.
    #[error("cancel refused: {reason}")]
    Refused {
        /// Reason reported by the source.
        reason: String,
    },

    /// `cancel()` panicked; the panic was caught.
    #[error("cancel panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl SeverError {
    /// Convenience constructor for [`SeverError::Refused`].
    pub fn refused(reason: impl Into<String>) -> Self {
        SeverError::Refused {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use racevisor::SeverError;
    ///
    /// assert_eq!(SeverError::refused("busy").as_label(), "sever_refused");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SeverError::Refused { .. } => "sever_refused",
            SeverError::Panicked { .. } => "sever_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SeverError::Refused { reason } => format!("refused: {reason}"),
            SeverError::Panicked { info } => format!("panicked: {info}"),
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(RaceError::NoRuntime.as_label(), "race_no_runtime");
        let err = SeverError::Panicked {
            info: "boom".into(),
        };
        assert_eq!(err.as_label(), "sever_panicked");
        assert_eq!(err.as_message(), "panicked: boom");
        assert_eq!(err.to_string(), "cancel panicked: boom");
    }

    #[test]
    fn test_panic_info_downcasts() {
        let caught = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_info(caught.as_ref()), "static message");

        let caught = std::panic::catch_unwind(|| panic!("formatted {}", 7)).unwrap_err();
        assert_eq!(panic_info(caught.as_ref()), "formatted 7");
    }
}
