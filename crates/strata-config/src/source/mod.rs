//! Concrete configuration sources.
//!
//! Every source stores its data in the same shape, an [`EntryMap`] keyed by
//! canonical path, and implements [`Provider`](crate::provider::Provider) by
//! delegating to it. What differs per source is only how the map is loaded:
//!
//! - [`MemorySource`] — in-memory pairs (also used by the base-section binder)
//! - [`JsonFileSource`] — a flattened JSON document
//! - [`EnvSource`] — environment variables with `__` → `:` normalization
//! - [`CommandLineSource`] — `--key=value` / `--key value` arguments
//! - [`SecretsDirSource`] — one file per key in a directory

mod args;
mod env;
mod json;
mod memory;
mod secrets;

pub use args::CommandLineSource;
pub use env::EnvSource;
pub use json::JsonFileSource;
pub use memory::MemorySource;
pub use secrets::SecretsDirSource;

use std::collections::{BTreeMap, BTreeSet};

use crate::key::{KEY_SEPARATOR, KeyPath};

/// Shared storage for map-backed sources.
///
/// Keys are canonical `:`-joined paths; a `None` value records a key that
/// exists but holds no scalar (a JSON `null`, a dangling command-line flag).
/// Child segments are derived from the stored keys on demand, so a stored
/// `a:b:c` makes `a` and `a:b` enumerable internal nodes.
#[derive(Debug, Default)]
pub(crate) struct EntryMap {
    entries: BTreeMap<String, Option<String>>,
}

impl EntryMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: Option<String>) {
        self.entries.insert(key, value);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The scalar stored at `key`, if any. Null values read as `None`.
    pub(crate) fn get(&self, key: &KeyPath) -> Option<String> {
        self.entries.get(key.as_str()).cloned().flatten()
    }

    /// Distinct immediate child segments beneath `parent`, sorted.
    pub(crate) fn child_keys(&self, parent: &KeyPath) -> Vec<String> {
        let mut segments = BTreeSet::new();
        if parent.is_root() {
            for key in self.entries.keys() {
                let first = key.split(KEY_SEPARATOR).next().unwrap_or_default();
                if !first.is_empty() {
                    segments.insert(first.to_owned());
                }
            }
        } else {
            let prefix = format!("{}{KEY_SEPARATOR}", parent.as_str());
            for key in self
                .entries
                .range(prefix.clone()..)
                .map(|(k, _)| k)
                .take_while(|k| k.starts_with(&prefix))
            {
                let remainder = &key[prefix.len()..];
                let segment = remainder.split(KEY_SEPARATOR).next().unwrap_or_default();
                if !segment.is_empty() {
                    segments.insert(segment.to_owned());
                }
            }
        }
        segments.into_iter().collect()
    }
}
