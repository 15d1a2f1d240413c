//! Handler-side view of a running pipeline.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::error::{PiperError, PiperResult};
use super::pipeline::Pipeline;
use crate::segment::Path;
use crate::util::{PipelineId, SegmentId};

/// The instance handle passed to every handler invocation.
///
/// Wraps the running pipeline with the identity of the segment whose
/// handler is executing, exposing the flow-control calls that decide
/// where batch items go next and the level-gated logging channel. All
/// calls complete synchronously; the scheduler does not resume until the
/// handler returns.
///
/// # Flow control
///
/// | Call | Destination |
/// |------|-------------|
/// | [`emit`](Self::emit) | own drain (the next stage) |
/// | [`eject`](Self::eject) | enclosing container's drain (skip the rest of the sub-pipeline) |
/// | [`inject`](Self::inject) | enclosing container's head queue (re-run the sub-pipeline) |
/// | [`recycle`](Self::recycle) | own queue, head-of-line |
/// | [`inject_at`](Self::inject_at) | addressed segment's pending queue |
/// | [`inject_after`](Self::inject_after) | addressed segment's drain |
pub struct SegmentContext<'a, T, A = ()> {
    pipeline: &'a mut Pipeline<T, A>,
    current: SegmentId,
}

impl<'a, T: fmt::Debug + 'static, A> SegmentContext<'a, T, A> {
    pub(crate) fn new(pipeline: &'a mut Pipeline<T, A>, current: SegmentId) -> Self {
        Self { pipeline, current }
    }

    // --- identity -------------------------------------------------------

    /// The executing segment.
    pub fn segment(&self) -> SegmentId {
        self.current
    }

    /// Full path of the executing segment.
    pub fn path(&self) -> &Path {
        self.pipeline.path(self.current)
    }

    /// Label of the executing segment.
    pub fn label(&self) -> &str {
        self.pipeline.label(self.current)
    }

    /// Id of the owning pipeline.
    pub fn pipeline_id(&self) -> PipelineId {
        self.pipeline.id()
    }

    /// The initialization arguments recorded on the root.
    pub fn args(&self) -> &A {
        self.pipeline.args()
    }

    /// Resolved batch size of the executing segment.
    pub fn batch_size(&self) -> usize {
        self.pipeline.resolved_batch_size(self.current)
    }

    // --- flow control ---------------------------------------------------

    /// Push items onto this segment's drain: the next stage.
    pub fn emit(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        self.pipeline.push_drain(self.current, items);
    }

    /// Push items onto the enclosing container's drain, skipping the rest
    /// of the sub-pipeline. Equivalent to [`emit`](Self::emit) at the
    /// root.
    pub fn eject(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        let target = self.pipeline.parent(self.current).unwrap_or(self.current);
        self.pipeline.push_drain(target, items);
    }

    /// Re-enter the enclosing container from its head. Items pass the
    /// gate of every segment they enter, so allow predicates apply again.
    pub fn inject(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        let target = self.pipeline.parent(self.current).unwrap_or(self.current);
        self.pipeline.enqueue_at(target, items);
    }

    /// Put items back at the head of this segment's own queue, ahead of
    /// anything still queued, preserving their relative order.
    pub fn recycle(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        self.pipeline.requeue_at(self.current, items);
    }

    /// Enqueue items at the segment the address resolves to.
    ///
    /// # Errors
    ///
    /// Raises a routing error through the ERROR channel if nothing
    /// matches the address.
    pub fn inject_at(
        &mut self,
        address: &str,
        items: impl IntoIterator<Item = T>,
    ) -> PiperResult<()> {
        let items: Vec<T> = items.into_iter().collect();
        match self.pipeline.find_segment_from(self.current, address) {
            Some(target) => {
                self.pipeline.enqueue_at(target, items);
                Ok(())
            }
            None => Err(self.routing_error(address)),
        }
    }

    /// Push items onto the drain of the segment the address resolves to.
    ///
    /// # Errors
    ///
    /// Raises a routing error through the ERROR channel if nothing
    /// matches the address.
    pub fn inject_after(
        &mut self,
        address: &str,
        items: impl IntoIterator<Item = T>,
    ) -> PiperResult<()> {
        let items: Vec<T> = items.into_iter().collect();
        match self.pipeline.find_segment_from(self.current, address) {
            Some(target) => {
                self.pipeline.push_drain(target, items);
                Ok(())
            }
            None => Err(self.routing_error(address)),
        }
    }

    /// Resolve an address from this segment's position in the tree.
    pub fn find_segment(&self, address: &str) -> Option<SegmentId> {
        self.pipeline.find_segment_from(self.current, address)
    }

    // --- logging --------------------------------------------------------

    /// INFO with this segment as context; fires when the resolved debug
    /// or verbose level is positive.
    pub fn info(&self, message: &str) {
        self.pipeline.log_info(self.current, message, &[]);
    }

    /// INFO with attached items.
    pub fn info_items(&self, message: &str, items: &[T]) {
        self.pipeline.log_info(self.current, message, items);
    }

    /// DEBUG with this segment as context; fires when the resolved debug
    /// level is positive.
    pub fn debug(&self, message: &str) {
        self.pipeline.log_debug(self.current, message, &[]);
    }

    /// DEBUG with attached items.
    pub fn debug_items(&self, message: &str, items: &[T]) {
        self.pipeline.log_debug(self.current, message, items);
    }

    /// Raise a non-fatal warning.
    pub fn warn(&self, message: &str) {
        self.pipeline.log_warn(self.current, message, &[]);
    }

    /// WARN with attached items.
    pub fn warn_items(&self, message: &str, items: &[T]) {
        self.pipeline.log_warn(self.current, message, items);
    }

    /// Raise a fatal error: the message reaches the ERROR channel and the
    /// returned value aborts the handler when propagated.
    ///
    /// ```rust,ignore
    /// return Err(ctx.error("input exhausted mid-record"));
    /// ```
    pub fn error(&self, message: &str) -> PiperError {
        self.pipeline.log_error(self.current, message);
        PiperError::handler(self.path().clone(), message)
    }

    fn routing_error(&self, address: &str) -> PiperError {
        self.pipeline
            .log_error(self.current, &format!("no segment matches address '{address}'"));
        PiperError::UnresolvedAddress {
            address: address.to_string(),
            from: self.path().clone(),
        }
    }
}

impl<T: fmt::Debug + 'static, A> fmt::Display for SegmentContext<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl<T: fmt::Debug + 'static, A> fmt::Debug for SegmentContext<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentContext")
            .field("segment", &self.current)
            .field("path", self.path())
            .finish()
    }
}
