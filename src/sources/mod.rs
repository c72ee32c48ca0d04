//! Reference sources.
//!
//! - [`Subject`]: hot, manually driven, ignores demand.
//! - [`Range`]: cold, synchronous, honours demand.
//! - [`Timed`]: cold, asynchronous, emits a schedule on the Tokio timer.
//! - [`SourceFn`]: closure-backed.

mod range;
mod source_fn;
mod subject;
mod timed;

pub use range::Range;
pub use source_fn::SourceFn;
pub use subject::Subject;
pub use timed::Timed;
