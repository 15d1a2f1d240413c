//! Segment descriptors: the immutable pipeline declaration.

// Layer 1: Standard library imports
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde_json::{Map, Value};

// Layer 3: Internal module imports
use super::error::BuildError;
use crate::instance::context::SegmentContext;
use crate::instance::error::PiperError;

/// Boxed handler invoked once per batch with the segment's context.
///
/// The handler decides the fate of every item in the batch through the
/// context's flow-control calls (`emit`, `eject`, `inject`, `recycle`,
/// `inject_at`, `inject_after`); items it does not forward are dropped.
/// Returning `Err` aborts the current scheduling step and the batch that
/// was dequeued for it is lost.
pub type Handler<T, A> =
    Box<dyn FnMut(&mut SegmentContext<'_, T, A>, Vec<T>) -> Result<(), PiperError>>;

/// Boxed per-item admission predicate.
///
/// Items failing the predicate bypass the segment and go straight to its
/// drain; see the enqueue gating rules on
/// [`Pipeline::enqueue`](crate::instance::Pipeline::enqueue).
pub type AllowPredicate<T> = Box<dyn Fn(&T) -> bool>;

// Type-scoped counters for auto-generated labels.
static PROCESS_COUNTER: AtomicU64 = AtomicU64::new(0);
static CONTAINER_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_process_label() -> String {
    format!("process-{}", PROCESS_COUNTER.fetch_add(1, Ordering::Relaxed) + 1)
}

fn next_container_label() -> String {
    format!(
        "container-{}",
        CONTAINER_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
    )
}

/// The two shapes a segment can take.
///
/// Handler presence is implied by the variant: only processes run user
/// code, only containers have children.
pub enum SegmentKind<T, A = ()> {
    /// Leaf segment wrapping a user handler
    Process {
        /// Batch handler, invoked by the scheduler
        handler: Handler<T, A>,
    },

    /// Interior segment composing children in order
    Container {
        /// Ordered child descriptors; never empty in a valid tree
        children: Vec<SegmentDescriptor<T, A>>,
    },
}

/// Immutable user-visible definition of one segment.
///
/// Descriptors are built with [`process`](SegmentDescriptor::process) or
/// [`container`](SegmentDescriptor::container), refined with the `with_*`
/// builder methods, and consumed by
/// [`Pipeline::init`](crate::instance::Pipeline::init). They are never
/// mutated after instantiation.
///
/// `batch_size` and `enabled` are optional on purpose: an unset value is
/// inherited from the enclosing container at run time, falling back to
/// the engine defaults at the root.
///
/// # Example
///
/// ```rust
/// use piper::prelude::*;
///
/// let desc = SegmentDescriptor::process("half", |ctx: &mut SegmentContext<'_, u32>, batch| {
///     let halved: Vec<u32> = batch.into_iter().map(|x| x / 2).collect();
///     ctx.emit(halved);
///     Ok(())
/// })
/// .with_allow(|x| x % 2 == 0)
/// .with_batch_size(2);
///
/// assert_eq!(desc.label(), "half");
/// assert!(desc.is_process());
/// ```
pub struct SegmentDescriptor<T, A = ()> {
    label: String,
    allow: Option<AllowPredicate<T>>,
    batch_size: Option<usize>,
    enabled: Option<bool>,
    extra: Map<String, Value>,
    kind: SegmentKind<T, A>,
}

impl<T, A> SegmentDescriptor<T, A> {
    /// Declare a leaf segment with the given label and batch handler.
    pub fn process<F>(label: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&mut SegmentContext<'_, T, A>, Vec<T>) -> Result<(), PiperError> + 'static,
    {
        Self {
            label: label.into(),
            allow: None,
            batch_size: None,
            enabled: None,
            extra: Map::new(),
            kind: SegmentKind::Process {
                handler: Box::new(handler),
            },
        }
    }

    /// Declare a leaf segment with an auto-generated `process-N` label.
    pub fn anonymous_process<F>(handler: F) -> Self
    where
        F: FnMut(&mut SegmentContext<'_, T, A>, Vec<T>) -> Result<(), PiperError> + 'static,
    {
        Self::process(next_process_label(), handler)
    }

    /// Declare a container segment composing `children` in order.
    pub fn container(label: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            label: label.into(),
            allow: None,
            batch_size: None,
            enabled: None,
            extra: Map::new(),
            kind: SegmentKind::Container { children },
        }
    }

    /// Declare a container with an auto-generated `container-N` label.
    pub fn anonymous_container(children: Vec<Self>) -> Self {
        Self::container(next_container_label(), children)
    }

    /// Attach an admission predicate.
    pub fn with_allow<F>(mut self, allow: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.allow = Some(Box::new(allow));
        self
    }

    /// Set this segment's batch size, shadowing the inherited value.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Explicitly enable or disable this segment.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Record a free-form construction option under `key`.
    ///
    /// Unknown options are carried verbatim; the engine never interprets
    /// them.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The segment label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared batch size, if any.
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    /// Declared enablement, if any.
    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }

    /// Free-form construction options.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Whether this descriptor is a leaf.
    pub fn is_process(&self) -> bool {
        matches!(self.kind, SegmentKind::Process { .. })
    }

    /// Whether this descriptor is a container.
    pub fn is_container(&self) -> bool {
        matches!(self.kind, SegmentKind::Container { .. })
    }

    /// Child descriptors, empty for processes.
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            SegmentKind::Container { children } => children,
            SegmentKind::Process { .. } => &[],
        }
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        String,
        Option<AllowPredicate<T>>,
        Option<usize>,
        Option<bool>,
        Map<String, Value>,
        SegmentKind<T, A>,
    ) {
        (
            self.label,
            self.allow,
            self.batch_size,
            self.enabled,
            self.extra,
            self.kind,
        )
    }

    /// Validate the whole descriptor tree.
    ///
    /// Checks, per node: the label is non-empty, a declared batch size is
    /// positive, containers have at least one child, and sibling labels
    /// are unique (ambiguous sibling addressing is rejected at build time
    /// rather than resolved arbitrarily at run time).
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.label.is_empty() {
            return Err(BuildError::EmptyLabel);
        }
        if self.batch_size == Some(0) {
            return Err(BuildError::ZeroBatchSize {
                label: self.label.clone(),
            });
        }
        if let SegmentKind::Container { children } = &self.kind {
            if children.is_empty() {
                return Err(BuildError::EmptyContainer {
                    label: self.label.clone(),
                });
            }
            let mut seen = HashSet::new();
            for child in children {
                if !seen.insert(child.label.as_str()) {
                    return Err(BuildError::DuplicateSiblingLabel {
                        label: child.label.clone(),
                        container: self.label.clone(),
                    });
                }
                child.validate()?;
            }
        }
        Ok(())
    }
}

impl<T, A> fmt::Debug for SegmentDescriptor<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentDescriptor")
            .field("label", &self.label)
            .field("kind", match &self.kind {
                SegmentKind::Process { .. } => &"process",
                SegmentKind::Container { .. } => &"container",
            })
            .field("allow", &self.allow.is_some())
            .field("batch_size", &self.batch_size)
            .field("enabled", &self.enabled)
            .field("children", &self.children().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop() -> SegmentDescriptor<u32> {
        SegmentDescriptor::process("noop", |_ctx, _batch| Ok(()))
    }

    #[test]
    fn test_process_descriptor_shape() {
        let desc = noop().with_batch_size(4).with_enabled(false);
        assert!(desc.is_process());
        assert!(!desc.is_container());
        assert_eq!(desc.label(), "noop");
        assert_eq!(desc.batch_size(), Some(4));
        assert_eq!(desc.enabled(), Some(false));
        assert!(desc.children().is_empty());
    }

    #[test]
    fn test_container_descriptor_shape() {
        let desc = SegmentDescriptor::container("main", vec![noop()]);
        assert!(desc.is_container());
        assert_eq!(desc.children().len(), 1);
        assert_eq!(desc.batch_size(), None);
        assert_eq!(desc.enabled(), None);
    }

    #[test]
    fn test_anonymous_labels_are_unique_and_type_scoped() {
        let p1: SegmentDescriptor<u32> = SegmentDescriptor::anonymous_process(|_, _| Ok(()));
        let p2: SegmentDescriptor<u32> = SegmentDescriptor::anonymous_process(|_, _| Ok(()));
        let c1: SegmentDescriptor<u32> = SegmentDescriptor::anonymous_container(vec![noop()]);

        assert!(p1.label().starts_with("process-"));
        assert!(p2.label().starts_with("process-"));
        assert_ne!(p1.label(), p2.label());
        assert!(c1.label().starts_with("container-"));
    }

    #[test]
    fn test_extra_carries_unknown_options() {
        let desc = noop().with_extra("color", json!("blue"));
        assert_eq!(desc.extra().get("color"), Some(&json!("blue")));
    }

    #[test]
    fn test_validate_accepts_well_formed_tree() {
        let desc = SegmentDescriptor::container(
            "main",
            vec![noop(), SegmentDescriptor::container("sub", vec![noop()])],
        );
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_label() {
        let desc: SegmentDescriptor<u32> = SegmentDescriptor::process("", |_, _| Ok(()));
        assert_eq!(desc.validate(), Err(BuildError::EmptyLabel));
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let desc = noop().with_batch_size(0);
        assert!(matches!(
            desc.validate(),
            Err(BuildError::ZeroBatchSize { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_container() {
        let desc: SegmentDescriptor<u32> = SegmentDescriptor::container("main", vec![]);
        assert!(matches!(
            desc.validate(),
            Err(BuildError::EmptyContainer { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_sibling_labels() {
        let desc = SegmentDescriptor::container(
            "main",
            vec![
                SegmentDescriptor::process("worker", |_: &mut SegmentContext<'_, u32>, _| Ok(())),
                SegmentDescriptor::process("worker", |_: &mut SegmentContext<'_, u32>, _| Ok(())),
            ],
        );
        assert!(matches!(
            desc.validate(),
            Err(BuildError::DuplicateSiblingLabel { .. })
        ));
    }

    #[test]
    fn test_validate_allows_same_label_in_different_containers() {
        let desc = SegmentDescriptor::container(
            "main",
            vec![
                SegmentDescriptor::container(
                    "pipeA",
                    vec![SegmentDescriptor::process(
                        "worker",
                        |_: &mut SegmentContext<'_, u32>, _| Ok(()),
                    )],
                ),
                SegmentDescriptor::process("worker", |_: &mut SegmentContext<'_, u32>, _| Ok(())),
            ],
        );
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_debug_omits_closures() {
        let desc = noop().with_allow(|x| *x > 0);
        let debug = format!("{desc:?}");
        assert!(debug.contains("noop"));
        assert!(debug.contains("allow: true"));
    }
}
