//! Runtime error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::segment::{BuildError, Path};

/// Convenience alias for engine results.
pub type PiperResult<T> = Result<T, PiperError>;

/// Errors surfaced by a running pipeline.
///
/// The scheduler never catches these; they propagate out of
/// `process_batch` / `prepare` / `dequeue` to the caller, and the batch
/// dequeued for a failing handler is lost. Allow-predicate rejections
/// and disabled-segment passthroughs are normal flow, not errors.
#[derive(Debug, Error)]
pub enum PiperError {
    /// Construction-time validation failure
    #[error(transparent)]
    Build(#[from] BuildError),

    /// `inject_at` / `inject_after` with an address no segment matches
    #[error("no segment matches address '{address}' (requested from '{from}')")]
    UnresolvedAddress { address: String, from: Path },

    /// A user handler failed or raised through the ERROR channel
    #[error("handler failed in segment '{segment}': {reason}")]
    Handler { segment: Path, reason: String },

    /// Internal invariant violation; should be impossible
    #[error("pipeline invariant violated: {0}")]
    Invariant(String),
}

impl PiperError {
    /// Build a handler error for `segment`.
    pub fn handler(segment: Path, reason: impl Into<String>) -> Self {
        Self::Handler {
            segment,
            reason: reason.into(),
        }
    }

    /// Whether this is a routing error.
    pub fn is_routing(&self) -> bool {
        matches!(self, Self::UnresolvedAddress { .. })
    }

    /// Whether this error came from pipeline construction.
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Invariant violations mean the engine state can no longer be
    /// trusted; everything else is scoped to the failing operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_address_names_the_address() {
        let err = PiperError::UnresolvedAddress {
            address: "bad".into(),
            from: Path::new("main/worker"),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad"));
        assert!(msg.contains("main/worker"));
        assert!(err.is_routing());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_handler_error_display() {
        let err = PiperError::handler(Path::single("half"), "division underflow");
        assert!(err.to_string().contains("half"));
        assert!(err.to_string().contains("division underflow"));
    }

    #[test]
    fn test_build_error_converts() {
        let err: PiperError = BuildError::EmptyLabel.into();
        assert!(err.is_build());
    }

    #[test]
    fn test_invariant_is_fatal() {
        let err = PiperError::Invariant("queue missing".into());
        assert!(err.is_fatal());
    }
}
