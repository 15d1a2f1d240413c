//! Convenience re-exports for pipeline authors.
//!
//! ```rust
//! use piper::prelude::*;
//! ```

pub use crate::config::{EngineConfig, EngineConfigBuilder, DEFAULT_BATCH_SIZE};
pub use crate::instance::{Pipeline, PiperError, PiperResult, SegmentContext, SegmentOverrides};
pub use crate::logger::{LogRecord, PipeLogger, TracingPipeLogger};
pub use crate::queue::{QueueBehavior, SimpleQueue};
pub use crate::segment::{BuildError, Path, SegmentDescriptor, SegmentKind};
pub use crate::util::{PipelineId, SegmentId};
