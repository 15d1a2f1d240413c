//! The FIFO interface consumed by the engine.

// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// FIFO container of in-flight items.
///
/// The engine calls exactly four operations: append to the tail, prepend
/// to the head, remove from the head, and report the current size. There
/// is no blocking and no capacity limit; backpressure in the scheduler is
/// derived from [`ready`](Self::ready), not enforced here.
///
/// # Ordering
///
/// `requeue` prepends while preserving the relative order of its
/// arguments: `requeue([a, b])` followed by `dequeue(1)` returns `a`.
///
/// # Example
///
/// ```rust
/// use piper::queue::{QueueBehavior, SimpleQueue};
///
/// let mut queue = SimpleQueue::new();
/// queue.enqueue(vec![1, 2, 3]);
/// queue.requeue(vec![0]);
///
/// assert_eq!(queue.ready(), 4);
/// assert_eq!(queue.dequeue(2), vec![0, 1]);
/// ```
pub trait QueueBehavior<T>: Debug {
    /// Append items to the tail of the queue.
    fn enqueue(&mut self, items: Vec<T>);

    /// Prepend items to the head of the queue, preserving their order.
    fn requeue(&mut self, items: Vec<T>);

    /// Remove up to `n` items from the head and return them in order.
    fn dequeue(&mut self, n: usize) -> Vec<T>;

    /// Remove a single item from the head, if any.
    fn dequeue_one(&mut self) -> Option<T> {
        let mut items = self.dequeue(1);
        if items.is_empty() {
            None
        } else {
            Some(items.remove(0))
        }
    }

    /// Number of items currently queued.
    fn ready(&self) -> usize;

    /// Whether the queue holds no items.
    fn is_empty(&self) -> bool {
        self.ready() == 0
    }
}
