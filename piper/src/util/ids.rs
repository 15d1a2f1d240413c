// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Identity of one pipeline instance.
///
/// Two pipelines built from the same descriptor tree are still distinct
/// instances; this id is what tells them apart, e.g. when several
/// pipelines log through one subscriber. Freshly minted at `init` and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineId(Uuid);

impl PipelineId {
    /// Mint a fresh pipeline id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PipelineId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a segment instance within one pipeline.
///
/// Segments live in an arena owned by the pipeline; a `SegmentId` is the
/// segment's slot index. Ids are only meaningful for the pipeline that
/// issued them and stay valid for that pipeline's whole lifetime (the
/// segment tree never changes after `init`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(usize);

impl SegmentId {
    /// Wrap an arena slot index.
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// The arena slot index.
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_ids_are_distinct() {
        let id1 = PipelineId::new();
        let id2 = PipelineId::new();

        assert_ne!(id1, id2);
        assert_ne!(PipelineId::default(), PipelineId::default());
    }

    #[test]
    fn test_pipeline_id_displays_as_uuid() {
        let rendered = PipelineId::new().to_string();

        // 8-4-4-4-12 hyphenated form
        assert_eq!(rendered.len(), 36);
        assert_eq!(rendered.matches('-').count(), 4);
    }

    #[test]
    fn test_pipeline_id_serde_roundtrip() {
        let id = PipelineId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: PipelineId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_segment_id_display() {
        let id = SegmentId::from_index(7);
        assert_eq!(format!("{id}"), "segment#7");
    }

    #[test]
    fn test_segment_id_roundtrip() {
        let id = SegmentId::from_index(3);
        assert_eq!(id.index(), 3);
        assert_eq!(id, SegmentId::from_index(3));
    }
}
