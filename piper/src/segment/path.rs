//! Slash-joined label paths.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Immutable sequence of non-empty labels, printed as `a/b/c`.
///
/// Paths name segments inside a pipeline tree: the root's path is its own
/// label and every descendant appends one label per level. Paths are used
/// as address-cache keys, as the printable handle of an instance, and for
/// suffix matching during address resolution.
///
/// # Example
///
/// ```rust
/// use piper::segment::Path;
///
/// let path = Path::new("main/subpipe").child("worker");
/// assert_eq!(path.to_string(), "main/subpipe/worker");
/// assert_eq!(path.name(), Some("worker"));
/// assert!(path.ends_with(&Path::new("subpipe/worker")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    labels: Vec<String>,
}

impl Path {
    /// Split a `/`-joined address into a path, dropping empty components.
    pub fn new(address: &str) -> Self {
        Self {
            labels: address
                .split('/')
                .filter(|label| !label.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// A single-label path.
    pub fn single(label: impl Into<String>) -> Self {
        Self {
            labels: vec![label.into()],
        }
    }

    /// Return this path extended with one more label.
    pub fn child(&self, label: impl Into<String>) -> Self {
        let mut labels = self.labels.clone();
        labels.push(label.into());
        Self { labels }
    }

    /// The component list.
    pub fn split(&self) -> &[String] {
        &self.labels
    }

    /// The last component, if any.
    pub fn name(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the path has no components.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether this path ends with all components of `suffix`, in order.
    pub fn ends_with(&self, suffix: &Path) -> bool {
        if suffix.labels.len() > self.labels.len() {
            return false;
        }
        let offset = self.labels.len() - suffix.labels.len();
        self.labels[offset..] == suffix.labels[..]
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join("/"))
    }
}

impl From<&str> for Path {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_on_slash() {
        let path = Path::new("main/subpipe/worker");
        assert_eq!(path.split(), ["main", "subpipe", "worker"]);
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_new_drops_empty_components() {
        let path = Path::new("/main//worker/");
        assert_eq!(path.split(), ["main", "worker"]);
    }

    #[test]
    fn test_empty_address_yields_empty_path() {
        let path = Path::new("");
        assert!(path.is_empty());
        assert_eq!(path.name(), None);
    }

    #[test]
    fn test_child_appends() {
        let path = Path::single("main").child("worker");
        assert_eq!(path.to_string(), "main/worker");
    }

    #[test]
    fn test_name_is_last_component() {
        assert_eq!(Path::new("a/b/c").name(), Some("c"));
        assert_eq!(Path::single("solo").name(), Some("solo"));
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Path::new("a/b"), Path::single("a").child("b"));
        assert_ne!(Path::new("a/b"), Path::new("a/c"));
    }

    #[test]
    fn test_ends_with_suffix_match() {
        let path = Path::new("main/subpipe/worker");
        assert!(path.ends_with(&Path::new("worker")));
        assert!(path.ends_with(&Path::new("subpipe/worker")));
        assert!(path.ends_with(&path.clone()));
        assert!(!path.ends_with(&Path::new("main/worker")));
        assert!(!path.ends_with(&Path::new("other/main/subpipe/worker")));
    }

    #[test]
    fn test_display_joins_with_slash() {
        assert_eq!(Path::new("a/b/c").to_string(), "a/b/c");
    }

    #[test]
    fn test_ordering_is_lexicographic_by_components() {
        assert!(Path::new("a/b") < Path::new("a/c"));
        assert!(Path::new("a") < Path::new("a/b"));
    }
}
