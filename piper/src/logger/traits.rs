//! Core logger trait and log record type.

// Layer 1: Standard library imports
use std::fmt::Debug;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::segment::Path;

/// One engine log event with its segment context.
///
/// The originating instance is injected automatically: `segment` is the
/// full path of the segment the event happened in, so a logger knows
/// where in the tree a message came from without any cooperation from
/// handler code. Items travelling with the event (skipped items, routing
/// payloads) are rendered to strings up front so the record is
/// self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Path of the segment the event originated from
    pub segment: Path,

    /// Event creation timestamp
    pub timestamp: DateTime<Utc>,

    /// Human-readable message
    pub message: String,

    /// Items attached to the event, rendered via `Debug`
    pub items: Vec<String>,
}

impl LogRecord {
    /// Create a record for `segment` with the given message.
    pub fn new(segment: Path, message: impl Into<String>) -> Self {
        Self {
            segment,
            timestamp: Utc::now(),
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Attach items, rendering each through its `Debug` implementation.
    pub fn with_items<T: Debug>(mut self, items: &[T]) -> Self {
        self.items = items.iter().map(|item| format!("{item:?}")).collect();
        self
    }
}

/// Logger interface consumed by the engine.
///
/// Implementations receive fully-formed records; gating (INFO fires when
/// the segment's resolved debug or verbose level is positive, DEBUG when
/// debug is positive) has already happened. WARN and ERROR are always
/// delivered. A custom implementation is installed through
/// [`EngineConfig`](crate::config::EngineConfig).
pub trait PipeLogger: Debug {
    /// Informational flow event (passthroughs, skipped items).
    fn info(&self, record: &LogRecord);

    /// Scheduler- and handler-level diagnostics.
    fn debug(&self, record: &LogRecord);

    /// Non-fatal warning.
    fn warn(&self, record: &LogRecord);

    /// Fatal error; the engine aborts the current handler invocation
    /// after raising it.
    fn error(&self, record: &LogRecord);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_carries_segment_context() {
        let record = LogRecord::new(Path::new("main/worker"), "skipped items");
        assert_eq!(record.segment, Path::new("main/worker"));
        assert_eq!(record.message, "skipped items");
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_with_items_renders_debug() {
        let record = LogRecord::new(Path::single("main"), "dropped").with_items(&[1, 2, 3]);
        assert_eq!(record.items, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_record_serializes() {
        let record = LogRecord::new(Path::single("main"), "hello").with_items(&["a"]);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("hello"));
        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.segment, record.segment);
        assert_eq!(back.items, record.items);
    }
}
