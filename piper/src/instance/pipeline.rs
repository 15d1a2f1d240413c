//! The root pipeline instance.

// Layer 1: Standard library imports
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

// Layer 2: Third-party crate imports
use serde_json::{Map, Value};

// Layer 3: Internal module imports
use super::error::{PiperError, PiperResult};
use super::node::{Node, NodeKind, SegmentOverrides};
use crate::config::{self, EngineConfig, DEFAULT_DEBUG, DEFAULT_ENABLED, DEFAULT_VERBOSE};
use crate::logger::LogRecord;
use crate::queue::QueueBehavior;
use crate::segment::descriptor::SegmentKind;
use crate::segment::{BuildError, Path, SegmentDescriptor};
use crate::util::{PipelineId, SegmentId};

/// A runnable pipeline: the runtime incarnation of a descriptor tree.
///
/// Built once by [`init`](Self::init), then driven from the root: feed
/// items with [`enqueue`](Self::enqueue), advance with
/// [`prepare`](Self::prepare) / [`flush`](Self::flush), and drain results
/// with [`dequeue`](Self::dequeue). The instance is single-threaded;
/// external calls must be serialized by the caller.
///
/// # Queue topology
///
/// Each leaf owns a pending queue. A container's queue *is* its first
/// child's queue, so enqueueing at a container lands at its leftmost
/// leaf. A segment's drain is the next sibling's pending queue, or the
/// enclosing container's drain for the last sibling; the root drains
/// into an output queue owned here and read by [`dequeue`](Self::dequeue).
///
/// # Example
///
/// ```rust
/// use piper::prelude::*;
///
/// let desc = SegmentDescriptor::process("double", |ctx: &mut SegmentContext<'_, i32>, batch| {
///     let doubled: Vec<i32> = batch.into_iter().map(|x| x * 2).collect();
///     ctx.emit(doubled);
///     Ok(())
/// })
/// .with_batch_size(2);
///
/// let mut pipeline = Pipeline::init(desc, ())?;
/// pipeline.enqueue([1, 2, 3]);
/// pipeline.flush()?;
/// assert_eq!(pipeline.dequeue(3)?, vec![2, 4, 6]);
/// # Ok::<(), piper::PiperError>(())
/// ```
pub struct Pipeline<T, A = ()> {
    pub(crate) id: PipelineId,
    pub(crate) nodes: Vec<Node<T, A>>,
    pub(crate) root: SegmentId,
    pub(crate) root_drain: Box<dyn QueueBehavior<T>>,
    pub(crate) args: A,
    pub(crate) config: EngineConfig<T>,
    pub(crate) debug_env: Option<u32>,
    // Address memoization, keyed by (caller path, query). One table per
    // pipeline, so the owning root is implicit in the key; values are
    // ids, never references.
    pub(crate) cache: RefCell<HashMap<(Path, String), Option<SegmentId>>>,
}

impl<T: fmt::Debug + 'static, A> Pipeline<T, A> {
    /// Instantiate a descriptor tree with default engine configuration.
    ///
    /// `args` is recorded on the root and readable from every handler via
    /// [`SegmentContext::args`](super::SegmentContext::args).
    ///
    /// # Errors
    ///
    /// Returns a construction error if the descriptor tree is invalid
    /// (empty or duplicate sibling labels, zero batch size, childless
    /// container).
    pub fn init(descriptor: SegmentDescriptor<T, A>, args: A) -> PiperResult<Self> {
        Self::init_with_config(descriptor, args, EngineConfig::default())
    }

    /// Instantiate a descriptor tree with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns a construction error if the descriptor tree or the
    /// configuration is invalid.
    pub fn init_with_config(
        descriptor: SegmentDescriptor<T, A>,
        args: A,
        config: EngineConfig<T>,
    ) -> PiperResult<Self> {
        config.validate()?;
        descriptor.validate()?;

        // Bottom-up: leaves are built before the containers wrapping them.
        let mut nodes = Vec::new();
        let root = Self::build_node(&mut nodes, descriptor, &config);

        let mut pipeline = Self {
            id: PipelineId::new(),
            root_drain: config.make_queue(),
            nodes,
            root,
            args,
            debug_env: config::debug_env_override(),
            config,
            cache: RefCell::new(HashMap::new()),
        };
        pipeline.wire_tree();
        Ok(pipeline)
    }

    fn build_node(
        nodes: &mut Vec<Node<T, A>>,
        descriptor: SegmentDescriptor<T, A>,
        config: &EngineConfig<T>,
    ) -> SegmentId {
        let (label, allow, batch_size, enabled, extra, kind) = descriptor.into_parts();
        let kind = match kind {
            SegmentKind::Process { handler } => NodeKind::Process {
                handler: Some(handler),
                queue: config.make_queue(),
            },
            SegmentKind::Container { children } => {
                let ids: Vec<SegmentId> = children
                    .into_iter()
                    .map(|child| Self::build_node(nodes, child, config))
                    .collect();
                let directory = ids
                    .iter()
                    .map(|&child| (nodes[child.index()].label.clone(), child))
                    .collect();
                NodeKind::Container {
                    children: ids,
                    directory,
                }
            }
        };
        let id = SegmentId::from_index(nodes.len());
        nodes.push(Node {
            path: Path::single(label.clone()),
            label,
            parent: None,
            allow,
            batch_size,
            enabled,
            extra,
            overrides: SegmentOverrides::default(),
            kind,
        });
        id
    }

    // Parent back-links and full paths, set top-down after the bottom-up
    // build.
    fn wire_tree(&mut self) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let path = self.nodes[id.index()].path.clone();
            for child in self.nodes[id.index()].children().to_vec() {
                let node = &mut self.nodes[child.index()];
                node.parent = Some(id);
                node.path = path.child(node.label.clone());
                stack.push(child);
            }
        }
    }

    // --- identity and tree accessors -----------------------------------

    /// This pipeline's unique id.
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// The root segment.
    pub fn root(&self) -> SegmentId {
        self.root
    }

    /// The initialization arguments recorded at `init`.
    pub fn args(&self) -> &A {
        &self.args
    }

    /// Full path of a segment.
    pub fn path(&self, id: SegmentId) -> &Path {
        &self.nodes[id.index()].path
    }

    /// Label of a segment.
    pub fn label(&self, id: SegmentId) -> &str {
        &self.nodes[id.index()].label
    }

    /// Parent of a segment; `None` for the root.
    pub fn parent(&self, id: SegmentId) -> Option<SegmentId> {
        self.nodes[id.index()].parent
    }

    /// Ordered children of a segment; empty for processes.
    pub fn children(&self, id: SegmentId) -> &[SegmentId] {
        self.nodes[id.index()].children()
    }

    /// Whether the segment is a leaf wrapping a handler.
    pub fn is_process(&self, id: SegmentId) -> bool {
        self.nodes[id.index()].is_process()
    }

    /// Free-form construction options recorded on the segment.
    pub fn extra(&self, id: SegmentId) -> &Map<String, Value> {
        &self.nodes[id.index()].extra
    }

    // --- configuration resolution --------------------------------------

    /// Resolved batch size: override, then descriptor, then the parent
    /// chain, then the engine default.
    pub fn resolved_batch_size(&self, id: SegmentId) -> usize {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = &self.nodes[cursor.index()];
            if let Some(size) = node.overrides.batch_size {
                return size;
            }
            if let Some(size) = node.batch_size {
                return size;
            }
            current = node.parent;
        }
        self.config.batch_size()
    }

    /// Resolved enablement, same lookup order as batch size.
    pub fn resolved_enabled(&self, id: SegmentId) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = &self.nodes[cursor.index()];
            if let Some(enabled) = node.overrides.enabled {
                return enabled;
            }
            if let Some(enabled) = node.enabled {
                return enabled;
            }
            current = node.parent;
        }
        DEFAULT_ENABLED
    }

    /// Resolved debug level; `PIPER_DEBUG` trumps every override.
    pub fn resolved_debug(&self, id: SegmentId) -> u32 {
        if let Some(level) = self.debug_env {
            return level;
        }
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = &self.nodes[cursor.index()];
            if let Some(level) = node.overrides.debug {
                return level;
            }
            current = node.parent;
        }
        DEFAULT_DEBUG
    }

    /// Resolved verbosity level.
    pub fn resolved_verbose(&self, id: SegmentId) -> u32 {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = &self.nodes[cursor.index()];
            if let Some(level) = node.overrides.verbose {
                return level;
            }
            current = node.parent;
        }
        DEFAULT_VERBOSE
    }

    // --- per-instance overrides -----------------------------------------

    /// Override (or with `None` clear) a segment's batch size.
    ///
    /// # Errors
    ///
    /// Rejects `Some(0)`, which could never form a batch.
    pub fn set_batch_size(&mut self, id: SegmentId, batch_size: Option<usize>) -> PiperResult<()> {
        if batch_size == Some(0) {
            return Err(BuildError::ZeroBatchSize {
                label: self.nodes[id.index()].label.clone(),
            }
            .into());
        }
        self.nodes[id.index()].overrides.batch_size = batch_size;
        Ok(())
    }

    /// Override (or clear) a segment's enablement.
    pub fn set_enabled(&mut self, id: SegmentId, enabled: Option<bool>) {
        self.nodes[id.index()].overrides.enabled = enabled;
    }

    /// Override (or clear) a segment's debug level.
    pub fn set_debug(&mut self, id: SegmentId, debug: Option<u32>) {
        self.nodes[id.index()].overrides.debug = debug;
    }

    /// Override (or clear) a segment's verbosity level.
    pub fn set_verbose(&mut self, id: SegmentId, verbose: Option<u32>) {
        self.nodes[id.index()].overrides.verbose = verbose;
    }

    /// Current overrides of a segment.
    pub fn overrides(&self, id: SegmentId) -> SegmentOverrides {
        self.nodes[id.index()].overrides
    }

    // --- item intake ----------------------------------------------------

    /// Feed items into the pipeline.
    ///
    /// Enqueueing is gated: a disabled segment passes items straight to
    /// its drain, an `allow` predicate splits the batch between the
    /// pending queue and the drain, and containers delegate to their
    /// first child (whose own gate then applies).
    pub fn enqueue(&mut self, items: impl IntoIterator<Item = T>) {
        let items: Vec<T> = items.into_iter().collect();
        self.enqueue_at(self.root, items);
    }

    pub(crate) fn enqueue_at(&mut self, id: SegmentId, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        if !self.resolved_enabled(id) {
            self.log_info(id, "segment disabled, passing items through to drain", &items);
            self.push_drain(id, items);
            return;
        }
        let (accepted, rejected): (Vec<T>, Vec<T>) = {
            let node = &self.nodes[id.index()];
            match &node.allow {
                Some(allow) => items.into_iter().partition(|item| allow(item)),
                None => (items, Vec::new()),
            }
        };
        if !rejected.is_empty() {
            self.log_info(id, "items rejected by allow, passing through to drain", &rejected);
            self.push_drain(id, rejected);
        }
        if accepted.is_empty() {
            return;
        }
        let first_child = self.nodes[id.index()].children().first().copied();
        match first_child {
            Some(child) => self.enqueue_at(child, accepted),
            None => {
                if let NodeKind::Process { queue, .. } = &mut self.nodes[id.index()].kind {
                    queue.enqueue(accepted);
                }
            }
        }
    }

    /// Prepend items to a segment's own pending queue, head-of-line.
    pub(crate) fn requeue_at(&mut self, id: SegmentId, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        let leaf = self.leftmost_leaf(id);
        if let NodeKind::Process { queue, .. } = &mut self.nodes[leaf.index()].kind {
            queue.requeue(items);
        }
    }

    // --- drain topology -------------------------------------------------

    /// Write items to a segment's drain: the next sibling's pending queue,
    /// ascending past last-siblings, or the root output queue.
    ///
    /// Drain writes are raw; gating applies only on the `enqueue` path.
    pub(crate) fn push_drain(&mut self, id: SegmentId, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        let mut current = id;
        loop {
            let parent = match self.nodes[current.index()].parent {
                None => {
                    self.root_drain.enqueue(items);
                    return;
                }
                Some(parent) => parent,
            };
            let next = {
                let siblings = self.nodes[parent.index()].children();
                siblings
                    .iter()
                    .position(|&sibling| sibling == current)
                    .and_then(|pos| siblings.get(pos + 1).copied())
            };
            match next {
                Some(sibling) => {
                    let leaf = self.leftmost_leaf(sibling);
                    if let NodeKind::Process { queue, .. } = &mut self.nodes[leaf.index()].kind {
                        queue.enqueue(items);
                    }
                    return;
                }
                None => current = parent,
            }
        }
    }

    /// Descend through first children to the leaf whose queue a container
    /// aliases.
    pub(crate) fn leftmost_leaf(&self, id: SegmentId) -> SegmentId {
        let mut current = id;
        while let Some(&child) = self.nodes[current.index()].children().first() {
            current = child;
        }
        current
    }

    // --- counters -------------------------------------------------------

    /// Items queued but not yet processed, across the whole tree.
    pub fn pending(&self) -> usize {
        self.pending_of(self.root)
    }

    /// Items queued in the subtree rooted at `id`.
    pub fn pending_of(&self, id: SegmentId) -> usize {
        match &self.nodes[id.index()].kind {
            NodeKind::Process { queue, .. } => queue.ready(),
            NodeKind::Container { children, .. } => {
                children.iter().map(|&child| self.pending_of(child)).sum()
            }
        }
    }

    /// Whether any item is still pending.
    pub fn has_pending(&self) -> bool {
        self.pending() > 0
    }

    /// Items that reached the root drain and await dequeue.
    pub fn ready(&self) -> usize {
        self.root_drain.ready()
    }

    // --- logging --------------------------------------------------------

    pub(crate) fn log_info(&self, id: SegmentId, message: &str, items: &[T]) {
        if self.resolved_debug(id) > 0 || self.resolved_verbose(id) > 0 {
            let record =
                LogRecord::new(self.nodes[id.index()].path.clone(), message).with_items(items);
            self.config.logger().info(&record);
        }
    }

    pub(crate) fn log_debug(&self, id: SegmentId, message: &str, items: &[T]) {
        if self.resolved_debug(id) > 0 {
            let record =
                LogRecord::new(self.nodes[id.index()].path.clone(), message).with_items(items);
            self.config.logger().debug(&record);
        }
    }

    pub(crate) fn log_warn(&self, id: SegmentId, message: &str, items: &[T]) {
        let record = LogRecord::new(self.nodes[id.index()].path.clone(), message).with_items(items);
        self.config.logger().warn(&record);
    }

    pub(crate) fn log_error(&self, id: SegmentId, message: &str) {
        let record = LogRecord::new(self.nodes[id.index()].path.clone(), message);
        self.config.logger().error(&record);
    }

    pub(crate) fn invariant(&self, id: SegmentId, detail: &str) -> PiperError {
        PiperError::Invariant(format!(
            "{detail} (segment '{}')",
            self.nodes[id.index()].path
        ))
    }
}

impl<T, A> fmt::Debug for Pipeline<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("root", &self.root)
            .field("segments", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl<T, A> fmt::Display for Pipeline<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.nodes[self.root.index()].path)
    }
}
