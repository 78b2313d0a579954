//! Environment variable configuration source.

use crate::key::{KEY_SEPARATOR, KeyPath};
use crate::provider::{Provider, SourceKind};
use crate::source::EntryMap;

/// Separator accepted in variable names where `:` is not portable.
const ENV_SEPARATOR: &str = "__";

/// A source backed by environment variables.
///
/// Variable names are taken as-is except that every `__` is normalized to
/// the canonical `:` separator, so `DATABASE__HOST` addresses the same path
/// as a JSON `{"DATABASE": {"HOST": ...}}`. Names are case-sensitive.
#[derive(Debug, Default)]
pub struct EnvSource {
    entries: EntryMap,
}

impl EnvSource {
    /// Builds a source from explicit `(name, value)` pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = EntryMap::new();
        for (name, value) in vars {
            let key = name.as_ref().replace(ENV_SEPARATOR, KEY_SEPARATOR);
            entries.insert(key, Some(value.into()));
        }
        Self { entries }
    }

    /// Captures the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Number of captured variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variables were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Provider for EnvSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn child_keys(&self, parent: &KeyPath) -> Vec<String> {
        self.entries.child_keys(parent)
    }

    fn get(&self, key: &KeyPath) -> Option<String> {
        self.entries.get(key)
    }
}
