//! Arena slots for runtime segment instances.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Layer 3: Internal module imports
use crate::queue::QueueBehavior;
use crate::segment::descriptor::{AllowPredicate, Handler};
use crate::segment::Path;
use crate::util::SegmentId;

/// Per-instance settings shadowing the descriptor and the parent chain.
///
/// A `Some` value wins over everything inherited; `None` falls through to
/// the descriptor, then to the parent's resolved value, then to the
/// engine defaults. Setting a field back to `None` clears the override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentOverrides {
    /// Shadowed batch size
    pub batch_size: Option<usize>,
    /// Shadowed enablement
    pub enabled: Option<bool>,
    /// Shadowed debug level
    pub debug: Option<u32>,
    /// Shadowed verbosity level
    pub verbose: Option<u32>,
}

/// Runtime shape of one segment.
///
/// Mirrors the descriptor's two cases. A process owns its pending queue
/// and (between scheduler invocations) its handler; a container owns the
/// ordered child ids plus a label directory for address resolution. The
/// handler slot is `None` only while the handler is executing, which is
/// also what keeps the scheduler from re-entering a running leaf.
pub(crate) enum NodeKind<T, A> {
    Process {
        handler: Option<Handler<T, A>>,
        queue: Box<dyn QueueBehavior<T>>,
    },
    Container {
        children: Vec<SegmentId>,
        directory: HashMap<String, SegmentId>,
    },
}

/// One arena slot: the runtime incarnation of a descriptor.
///
/// Parent links are ids, never owning references, so the tree has no
/// reference cycles; the root is the single node with `parent == None`.
pub(crate) struct Node<T, A> {
    pub(crate) label: String,
    pub(crate) path: Path,
    pub(crate) parent: Option<SegmentId>,
    pub(crate) allow: Option<AllowPredicate<T>>,
    pub(crate) batch_size: Option<usize>,
    pub(crate) enabled: Option<bool>,
    pub(crate) extra: Map<String, Value>,
    pub(crate) overrides: SegmentOverrides,
    pub(crate) kind: NodeKind<T, A>,
}

impl<T, A> Node<T, A> {
    pub(crate) fn is_process(&self) -> bool {
        matches!(self.kind, NodeKind::Process { .. })
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    pub(crate) fn children(&self) -> &[SegmentId] {
        match &self.kind {
            NodeKind::Container { children, .. } => children,
            NodeKind::Process { .. } => &[],
        }
    }
}

impl<T, A> fmt::Debug for Node<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path)
            .field("parent", &self.parent)
            .field("kind", match &self.kind {
                NodeKind::Process { .. } => &"process",
                NodeKind::Container { .. } => &"container",
            })
            .field("children", &self.children())
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}
