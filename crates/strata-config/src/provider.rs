//! The provider capability consumed by the flattening engine.
//!
//! A [`Provider`] exposes a hierarchical namespace through two operations:
//! enumerating the immediate child segments beneath a path, and looking up
//! the scalar value at a full path. The traversal and aggregation layers are
//! written purely against this trait; the concrete sources live in
//! [`crate::source`].

use std::fmt;

use crate::key::KeyPath;

/// The kind of configuration source a provider represents.
///
/// Used to skip whole source categories during flattening and to label
/// provider headers in rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A directory holding one file per key.
    SecretsDirectory,
    /// Process environment variables.
    Environment,
    /// Process command-line arguments.
    CommandLine,
    /// A JSON configuration file.
    JsonFile,
    /// An in-memory key/value set.
    Memory,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretsDirectory => write!(f, "secrets-directory"),
            Self::Environment => write!(f, "environment"),
            Self::CommandLine => write!(f, "command-line"),
            Self::JsonFile => write!(f, "json-file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// A hierarchical configuration namespace.
///
/// Implementations are expected to be cheap and local (in-memory maps,
/// already-read files); nothing in this crate suspends or blocks beyond
/// whatever the provider itself does.
pub trait Provider: Send + Sync {
    /// Which kind of source this provider is.
    fn kind(&self) -> SourceKind;

    /// Distinct immediate child segments beneath `parent`, in stable order.
    ///
    /// `parent` equal to [`KeyPath::root`] enumerates top-level segments.
    /// A path with no children yields an empty vector; leaves and unknown
    /// paths look the same from this operation.
    fn child_keys(&self, parent: &KeyPath) -> Vec<String>;

    /// The scalar value stored at `key`.
    ///
    /// Returns `None` for missing keys, for internal (non-leaf) paths, and
    /// for keys whose stored value is null. The empty key addresses the
    /// root, which never holds a scalar.
    fn get(&self, key: &KeyPath) -> Option<String>;
}
