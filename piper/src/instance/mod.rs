//! Runtime pipeline instances.
//!
//! [`Pipeline::init`] turns a descriptor tree into an arena of instance
//! nodes wired with parent links, pending queues, and drains, then drives
//! it with the pressure-based batch scheduler. Handlers interact with the
//! running pipeline through [`SegmentContext`].
//!
//! # Components
//!
//! - [`Pipeline`] - The root instance: construction, gated enqueue, root API
//! - [`SegmentContext`] - Flow control and logging from inside a handler
//! - [`SegmentOverrides`] - Per-instance configuration shadowing
//! - [`PiperError`] - Runtime error taxonomy

pub mod context;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod schedule;

pub use context::SegmentContext;
pub use error::{PiperError, PiperResult};
pub use node::SegmentOverrides;
pub use pipeline::Pipeline;
