//! Downstream consumers.

mod recorder;

pub use recorder::Recorder;
