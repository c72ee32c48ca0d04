//! # Built-in subscribers
//!
//! - [`LogWriter`]: forwards events to `tracing` (requires the `logging` feature).

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
