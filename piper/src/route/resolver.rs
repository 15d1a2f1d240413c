//! Referrer-pruned depth-first address resolution.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::instance::node::NodeKind;
use crate::instance::Pipeline;
use crate::segment::Path;
use crate::util::SegmentId;

impl<T: fmt::Debug + 'static, A> Pipeline<T, A> {
    /// Resolve an address from the root's point of view.
    ///
    /// Resolution is pure and idempotent within a pipeline lifetime: the
    /// same query from the same caller always returns the same segment.
    pub fn find_segment(&self, address: &str) -> Option<SegmentId> {
        self.find_segment_from(self.root, address)
    }

    /// Resolve an address as seen from `caller`.
    ///
    /// The search tries `caller`'s own container first (or `caller`
    /// itself if it is a container), then ascends one container per
    /// round, marking the previously searched child as referrer so its
    /// subtree is not walked again. The nearest match wins; among equally
    /// deep matches under one container the lexicographically smallest
    /// path is chosen for determinism.
    pub fn find_segment_from(&self, caller: SegmentId, address: &str) -> Option<SegmentId> {
        let query = Path::new(address);
        if query.is_empty() {
            return None;
        }
        let key = (self.nodes[caller.index()].path.clone(), address.to_owned());
        if let Some(&cached) = self.cache.borrow().get(&key) {
            return cached;
        }
        let resolved = self.resolve_uncached(caller, &query);
        self.cache.borrow_mut().insert(key, resolved);
        resolved
    }

    fn resolve_uncached(&self, caller: SegmentId, query: &Path) -> Option<SegmentId> {
        let node = &self.nodes[caller.index()];

        // A parentless leaf is a one-segment pipeline; it can only name
        // itself.
        if node.is_process() && node.parent.is_none() {
            return (query.len() == 1 && query.name() == Some(node.label.as_str()))
                .then_some(caller);
        }

        let mut anchor = if node.is_container() {
            caller
        } else {
            node.parent?
        };
        let mut referrer = None;
        loop {
            if let Some(found) = self.descendant(anchor, query.split(), referrer) {
                return Some(found);
            }
            referrer = Some(anchor);
            anchor = self.nodes[anchor.index()].parent?;
        }
    }

    /// Match `labels` against the subtree under `node`, skipping the
    /// already-searched `referrer` child.
    fn descendant(
        &self,
        node: SegmentId,
        labels: &[String],
        referrer: Option<SegmentId>,
    ) -> Option<SegmentId> {
        let Some((head, rest)) = labels.split_first() else {
            return Some(node);
        };

        // Literal prefix: consume directory entries greedily.
        if let Some(reached) = self.walk_directory(node, labels) {
            return Some(reached);
        }

        // Otherwise search grandchildren, deterministically preferring
        // the lexicographically smallest matching path.
        let mut best: Option<SegmentId> = None;
        for &child in self.nodes[node.index()].children() {
            if Some(child) == referrer || !self.nodes[child.index()].is_container() {
                continue;
            }
            if let Some(found) = self.descendant(child, labels, None) {
                best = match best {
                    Some(current)
                        if self.nodes[current.index()].path <= self.nodes[found.index()].path =>
                    {
                        Some(current)
                    }
                    _ => Some(found),
                };
            }
        }
        if best.is_some() {
            return best;
        }

        // The path may begin with this container's own label; retry with
        // the remainder anchored here, marking ourselves as referrer to
        // prevent infinite regress.
        if *head == self.nodes[node.index()].label {
            return self.descendant(node, rest, Some(node));
        }
        None
    }

    fn walk_directory(&self, node: SegmentId, labels: &[String]) -> Option<SegmentId> {
        let mut current = node;
        for label in labels {
            match &self.nodes[current.index()].kind {
                NodeKind::Container { directory, .. } => {
                    current = directory.get(label).copied()?;
                }
                NodeKind::Process { .. } => return None,
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentDescriptor;

    fn emitter(label: &str) -> SegmentDescriptor<u32> {
        SegmentDescriptor::process(label, |ctx, batch| {
            ctx.emit(batch);
            Ok(())
        })
    }

    /// main { pipeA { processA, processB }, processA }
    fn ambiguous_pipeline() -> Pipeline<u32> {
        let desc = SegmentDescriptor::container(
            "main",
            vec![
                SegmentDescriptor::container("pipeA", vec![emitter("processA"), emitter("processB")]),
                emitter("processA"),
            ],
        );
        Pipeline::init(desc, ()).unwrap()
    }

    #[test]
    fn test_bare_label_resolves_direct_child() {
        let pipeline = ambiguous_pipeline();
        let found = pipeline.find_segment("pipeA").unwrap();
        assert_eq!(pipeline.path(found).to_string(), "main/pipeA");
    }

    #[test]
    fn test_slash_path_resolves_nested_segment() {
        let pipeline = ambiguous_pipeline();
        let found = pipeline.find_segment("pipeA/processB").unwrap();
        assert_eq!(pipeline.path(found).to_string(), "main/pipeA/processB");
    }

    #[test]
    fn test_query_may_start_with_own_label() {
        let pipeline = ambiguous_pipeline();
        let found = pipeline.find_segment("main/processA").unwrap();
        assert_eq!(pipeline.path(found).to_string(), "main/processA");
    }

    #[test]
    fn test_sibling_resolution_prefers_nearest() {
        // From inside pipeA/processB, the bare label processA means the
        // sibling, not the one at the root.
        let pipeline = ambiguous_pipeline();
        let caller = pipeline.find_segment("pipeA/processB").unwrap();
        let found = pipeline.find_segment_from(caller, "processA").unwrap();
        assert_eq!(pipeline.path(found).to_string(), "main/pipeA/processA");
    }

    #[test]
    fn test_qualified_path_escapes_sub_pipeline() {
        let pipeline = ambiguous_pipeline();
        let caller = pipeline.find_segment("pipeA/processB").unwrap();
        let found = pipeline.find_segment_from(caller, "main/processA").unwrap();
        assert_eq!(pipeline.path(found).to_string(), "main/processA");
    }

    #[test]
    fn test_unknown_address_is_none() {
        let pipeline = ambiguous_pipeline();
        assert_eq!(pipeline.find_segment("nope"), None);
        assert_eq!(pipeline.find_segment("pipeA/nope"), None);
        assert_eq!(pipeline.find_segment(""), None);
    }

    #[test]
    fn test_parentless_leaf_resolves_only_itself() {
        let pipeline = Pipeline::init(emitter("solo"), ()).unwrap();
        assert_eq!(pipeline.find_segment("solo"), Some(pipeline.root()));
        assert_eq!(pipeline.find_segment("other"), None);
        assert_eq!(pipeline.find_segment("solo/solo"), None);
    }

    #[test]
    fn test_resolution_is_idempotent_and_cached() {
        let pipeline = ambiguous_pipeline();
        let caller = pipeline.find_segment("pipeA/processB").unwrap();

        let first = pipeline.find_segment_from(caller, "processA");
        let second = pipeline.find_segment_from(caller, "processA");
        assert_eq!(first, second);

        // The memo table holds the answer now.
        let key = (pipeline.path(caller).clone(), "processA".to_owned());
        assert_eq!(pipeline.cache.borrow().get(&key), Some(&first));
    }

    #[test]
    fn test_grandchild_search_reaches_deep_segments() {
        let desc = SegmentDescriptor::container(
            "main",
            vec![SegmentDescriptor::container(
                "outer",
                vec![SegmentDescriptor::container("inner", vec![emitter("deep")])],
            )],
        );
        let pipeline = Pipeline::init(desc, ()).unwrap();
        let found = pipeline.find_segment("deep").unwrap();
        assert_eq!(pipeline.path(found).to_string(), "main/outer/inner/deep");
    }
}
