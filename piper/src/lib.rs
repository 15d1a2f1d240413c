//! # piper - Batched, Pressure-Driven Data-Flow Pipelines
//!
//! In-process data-flow pipeline engine: compose a tree of named
//! *segments*, feed items at the root, and drain transformed results
//! from the other end. Leaf segments ("processes") wrap a user handler
//! that transforms batches of items; interior segments ("containers")
//! compose children in order. Handlers can re-route items upstream,
//! downstream, sideways, or out through named segment addresses, giving
//! the engine the shape of a controllable dataflow graph.
//!
//! # Quick Start
//!
//! ```rust
//! use piper::prelude::*;
//!
//! // 1. Declare the segment tree
//! let halver = SegmentDescriptor::process("half", |ctx: &mut SegmentContext<'_, u32>, batch| {
//!     let halved: Vec<u32> = batch.into_iter().map(|x| x / 2).collect();
//!     ctx.emit(halved);
//!     Ok(())
//! })
//! .with_allow(|x| x % 2 == 0) // odd items bypass the handler
//! .with_batch_size(2);
//!
//! // 2. Instantiate and run
//! let mut pipeline = Pipeline::init(halver, ())?;
//! pipeline.enqueue([1, 2, 3, 4, 5]);
//! pipeline.flush()?;
//!
//! // Odd items passed through at enqueue time; evens were halved in
//! // batches of two.
//! assert_eq!(pipeline.dequeue(5)?, vec![1, 3, 5, 1, 2]);
//! # Ok::<(), piper::PiperError>(())
//! ```
//!
//! # Core Concepts
//!
//! ## Queue topology
//! Every leaf owns a pending queue; a container's queue *is* its first
//! child's queue. A segment's **drain** is the next sibling's pending
//! queue (or the enclosing container's drain for the last sibling); the
//! root drains into the output queue read by `dequeue`. Items in pending
//! queues are the input side of some leaf; items in the root drain are
//! the output of the whole pipeline.
//!
//! ## Pressure scheduling
//! Each `process_batch` advances exactly one leaf. Containers prefer the
//! rightmost child already holding a full batch (completing work near
//! the drain first), falling back to the fullest child, leftmost on
//! ties. Batch size is configurable per segment and inherited through
//! the tree, so each stage picks its own throughput/latency trade-off.
//!
//! ## Flow control
//! Inside a handler, [`SegmentContext`](instance::SegmentContext) offers
//! `emit`, `eject`, `inject`, `recycle`, `inject_at`, and `inject_after`
//! to decide where every item goes next; items not forwarded are simply
//! dropped.
//!
//! ## Addressing
//! `find_segment` resolves bare labels or `/`-joined paths outward from
//! the caller: the nearest enclosing container first, then ancestors,
//! with already-searched subtrees pruned and results memoized.
//!
//! # Module Organization
//!
//! ## Declaration
//! - [`segment`] - Descriptors, paths, and build-time validation
//! - [`config`] - Engine defaults (batch size, logger, queue factory)
//!
//! ## Execution
//! - [`instance`] - Runtime pipeline, scheduler, and handler context
//! - [`route`] - Address-based segment lookup
//!
//! ## Infrastructure
//! - [`queue`] - The consumed FIFO interface and built-in queue
//! - [`logger`] - Level-gated logging facade with segment context
//! - [`util`] - Id newtypes
//!
//! # Concurrency Model
//!
//! Single-threaded cooperative execution: exactly one handler runs at a
//! time, every operation completes synchronously, and a pipeline must
//! not be driven from multiple threads. Ordering is FIFO within each
//! segment's queue with batch atomicity; ordering across segments is
//! intentionally unspecified because scheduling follows pressure, not
//! arrival.
//!
//! # Environment
//!
//! `PIPER_DEBUG`, when set to a non-zero integer, overrides the resolved
//! debug level of every segment (see [`config`]).

pub mod config;
pub mod instance;
pub mod logger;
pub mod prelude;
pub mod queue;
pub mod route;
pub mod segment;
pub mod util;

// Re-export commonly used types
pub use config::{EngineConfig, EngineConfigBuilder, DEFAULT_BATCH_SIZE, DEBUG_ENV_VAR};
pub use instance::{Pipeline, PiperError, PiperResult, SegmentContext, SegmentOverrides};
pub use logger::{LogRecord, PipeLogger, TracingPipeLogger};
pub use queue::{QueueBehavior, SimpleQueue};
pub use segment::{BuildError, Path, SegmentDescriptor, SegmentKind};
pub use util::{PipelineId, SegmentId};
