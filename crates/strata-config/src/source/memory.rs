//! In-memory configuration source.

use crate::key::KeyPath;
use crate::provider::{Provider, SourceKind};
use crate::source::EntryMap;

/// A source backed by explicitly supplied key/value pairs.
///
/// Keys use the canonical `:` separator, so `insert("a:b", "v")` produces an
/// internal node `a` with a leaf child `b`. Mostly useful in tests and as the
/// synthetic source behind base-section binding.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: EntryMap,
}

impl MemorySource {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::new();
        for (key, value) in pairs {
            source.insert(key, value);
        }
        source
    }

    /// Stores a scalar at `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Stores a key that exists but holds no scalar.
    pub fn insert_null(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    /// Number of stored entries, null-valued ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the source holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Provider for MemorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Memory
    }

    fn child_keys(&self, parent: &KeyPath) -> Vec<String> {
        self.entries.child_keys(parent)
    }

    fn get(&self, key: &KeyPath) -> Option<String> {
        self.entries.get(key)
    }
}
