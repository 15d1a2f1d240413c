//! Logging facade with segment context injection.
//!
//! The engine consumes only the four level calls of [`PipeLogger`]; every
//! call carries a [`LogRecord`] naming the segment path it originated
//! from. Whether INFO and DEBUG records are produced at all is decided by
//! the per-segment debug/verbose resolution inside the engine, so a
//! logger implementation never needs to filter by level itself.
//!
//! # Components
//!
//! - [`PipeLogger`] - The consumed logger interface
//! - [`LogRecord`] - Segment path, timestamp, message, rendered items
//! - [`TracingPipeLogger`] - Default implementation over the `tracing`
//!   ecosystem

pub mod tracing;
pub mod traits;

pub use self::tracing::TracingPipeLogger;
pub use traits::{LogRecord, PipeLogger};
