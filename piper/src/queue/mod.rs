//! Per-segment FIFO queues.
//!
//! Every leaf segment owns a pending queue and the pipeline root owns an
//! output queue. The engine consumes nothing beyond the small
//! [`QueueBehavior`] interface, so any FIFO satisfying it may be swapped
//! in through the engine configuration's queue factory.
//!
//! # Components
//!
//! - [`QueueBehavior`] - The consumed FIFO interface
//! - [`SimpleQueue`] - Built-in `VecDeque`-backed implementation

pub mod simple;
pub mod traits;

pub use simple::SimpleQueue;
pub use traits::QueueBehavior;
