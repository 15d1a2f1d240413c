//! Tracing ecosystem integration logger implementation.

// Layer 1: Standard library imports
// (none for this simple implementation)

// Layer 2: Third-party crate imports
use tracing::{debug, error, info, warn};

// Layer 3: Internal module imports
use super::traits::{LogRecord, PipeLogger};

/// Default logger emitting records as `tracing` events.
///
/// Outputs log records through the tracing ecosystem, so pipelines plug
/// into whatever subscriber the application already installed. Segment
/// path, timestamp, and attached items travel as structured fields; no
/// configuration is needed.
#[derive(Debug, Default, Clone)]
pub struct TracingPipeLogger {
    // No fields needed - uses global tracing infrastructure
}

impl TracingPipeLogger {
    /// Create a new tracing logger.
    ///
    /// Uses the global tracing subscriber configured by the application.
    pub fn new() -> Self {
        Self {}
    }
}

impl PipeLogger for TracingPipeLogger {
    fn info(&self, record: &LogRecord) {
        info!(
            segment = %record.segment,
            timestamp = %record.timestamp,
            items = ?record.items,
            "{}",
            record.message
        );
    }

    fn debug(&self, record: &LogRecord) {
        debug!(
            segment = %record.segment,
            timestamp = %record.timestamp,
            items = ?record.items,
            "{}",
            record.message
        );
    }

    fn warn(&self, record: &LogRecord) {
        warn!(
            segment = %record.segment,
            timestamp = %record.timestamp,
            items = ?record.items,
            "{}",
            record.message
        );
    }

    fn error(&self, record: &LogRecord) {
        error!(
            segment = %record.segment,
            timestamp = %record.timestamp,
            items = ?record.items,
            "{}",
            record.message
        );
    }
}
