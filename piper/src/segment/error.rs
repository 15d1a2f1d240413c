//! Construction-time error types.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Errors reported while validating a segment tree or an engine
/// configuration, before any item flows.
///
/// Construction errors are fatal: an invalid descriptor never becomes a
/// running pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A segment label resolved to the empty string
    #[error("segment label must be a non-empty string")]
    EmptyLabel,

    /// Two siblings under one container share a label, which would make
    /// address resolution ambiguous
    #[error("duplicate label '{label}' among children of container '{container}'")]
    DuplicateSiblingLabel { label: String, container: String },

    /// A container was declared without children
    #[error("container '{label}' must have at least one child")]
    EmptyContainer { label: String },

    /// A batch size of zero can never form a batch
    #[error("batch size for segment '{label}' must be greater than zero")]
    ZeroBatchSize { label: String },

    /// Engine configuration validation error
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
