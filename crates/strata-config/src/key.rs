//! Canonical hierarchical key paths.
//!
//! A configuration key is a sequence of string segments joined by a single
//! reserved separator (`:`). Two paths are equal iff their canonical string
//! forms are equal. The empty path addresses the root of a provider tree;
//! lookups with a null or empty key normalize to it rather than failing.

use std::borrow::Borrow;
use std::fmt;

/// The reserved separator between key segments.
pub const KEY_SEPARATOR: &str = ":";

/// Join a parent path and a child segment.
///
/// The separator is omitted when either side is empty, so the root path
/// composes cleanly: `combine("", "a") == "a"` and `combine("a", "") == "a"`.
#[must_use]
pub fn combine(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_owned()
    } else if segment.is_empty() {
        parent.to_owned()
    } else {
        format!("{parent}{KEY_SEPARATOR}{segment}")
    }
}

/// A canonical `:`-joined configuration key path.
///
/// Stored in canonical string form; equality, ordering, and hashing all
/// operate on that form. [`KeyPath::root`] is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPath(String);

impl KeyPath {
    /// The empty root path.
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// True if this is the empty root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a child segment, omitting the separator if either side is
    /// empty.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self(combine(&self.0, segment))
    }

    /// Iterate over the path's segments. The root path yields nothing.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments in the path. The root path has depth zero.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for KeyPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
