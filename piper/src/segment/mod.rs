//! User-visible segment definitions.
//!
//! A pipeline is declared as a tree of immutable [`SegmentDescriptor`]s:
//! leaf descriptors ("processes") carry a handler, interior descriptors
//! ("containers") carry an ordered list of children. Descriptors are
//! consumed by [`Pipeline::init`](crate::instance::Pipeline::init), which
//! turns them into runtime instances.
//!
//! # Components
//!
//! - [`Path`] - Immutable `/`-joined label sequence
//! - [`SegmentDescriptor`] / [`SegmentKind`] - The segment definition
//! - [`BuildError`] - Construction-time validation failures

pub mod descriptor;
pub mod error;
pub mod path;

pub use descriptor::{AllowPredicate, Handler, SegmentDescriptor, SegmentKind};
pub use error::BuildError;
pub use path::Path;
