//! Address-based segment lookup.
//!
//! Addresses are bare labels (`b`) or `/`-joined paths (`subpipe/b`,
//! `main/subpipe/c`). Resolution searches outward from the caller:
//! nearest enclosing containers first, with already-searched subtrees
//! pruned via a referrer marker, and results memoized per
//! `(caller path, query)`.

pub mod resolver;
