//! Typed section binding.
//!
//! [`bind_section`] projects the subtree beneath a section key into any
//! [`DeserializeOwned`] target: leaves are discovered across every layer,
//! resolved to their effective values, assembled into a tree, and
//! deserialized with string-to-scalar coercion. [`bind_base_section`] is the
//! entry point for settings kept at the top level of the configuration
//! rather than in a named section: root-level scalars are re-rooted under a
//! synthetic `base` prefix and bound from there, with delimiter aliasing so
//! hyphenated keys can reach ordinary struct fields.

mod de;

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;

use crate::compose::LayeredConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::key::{KEY_SEPARATOR, KeyPath, combine};
use crate::source::MemorySource;
use crate::traverse::{DEFAULT_MAX_DEPTH, discover};

use de::{Node, NodeDeserializer};

/// Synthetic prefix under which root-level scalars bind.
pub const BASE_SECTION_KEY: &str = "base";

/// Alternate separator accepted from sources that cannot spell `:`, such as
/// secret file names.
const ALT_SEPARATOR: &str = "--";
/// Compound-word delimiter removed to form the bare alias.
const COMPOUND_DELIMITER: char = '-';

/// Binds the subtree beneath `section` into `T`.
///
/// Leaves are discovered across every layer and resolved through
/// [`LayeredConfig::get`], so the bound value reflects the same override
/// order as direct lookups. A leaf shadowed by a deeper structure in a
/// higher layer binds as the structure.
pub fn bind_section<T: DeserializeOwned>(config: &LayeredConfig, section: &str) -> ConfigResult<T> {
    let root = KeyPath::from(section);
    let mut keys: BTreeSet<KeyPath> = BTreeSet::new();
    for provider in config.providers() {
        keys.extend(discover(provider.as_ref(), &root, DEFAULT_MAX_DEPTH)?);
    }
    tracing::debug!(section, leaves = keys.len(), "binding section");

    let prefix = if root.is_root() {
        String::new()
    } else {
        format!("{}{KEY_SEPARATOR}", root.as_str())
    };
    let mut tree = Node::tree();
    for key in &keys {
        let value = config.get(key.as_str());
        let relative = key.as_str().strip_prefix(&prefix).unwrap_or(key.as_str());
        let segments: Vec<&str> = relative
            .split(KEY_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect();
        tree.insert(&segments, value);
    }
    T::deserialize(NodeDeserializer::new(&tree, root.as_str().to_owned()))
}

/// Binds root-level scalars into `T` through the synthetic base section.
///
/// `None` fails fast with [`ConfigError::MissingConfig`]. Only root keys
/// whose effective value is non-null participate; each key is canonicalized
/// by replacing `--` with `:`, and a key still containing `-` afterwards is
/// additionally registered with the hyphens removed. The `--` substitution
/// runs first, which fixes the reading of keys containing both delimiters.
pub fn bind_base_section<T: DeserializeOwned>(config: Option<&LayeredConfig>) -> ConfigResult<T> {
    let config = config.ok_or(ConfigError::MissingConfig)?;
    let mut synthetic = MemorySource::new();
    for key in config.root_keys() {
        let Some(value) = config.get(&key) else {
            continue;
        };
        let canonical = key.replace(ALT_SEPARATOR, KEY_SEPARATOR);
        if canonical.contains(COMPOUND_DELIMITER) {
            let alias: String = canonical
                .chars()
                .filter(|&c| c != COMPOUND_DELIMITER)
                .collect();
            synthetic.insert(combine(BASE_SECTION_KEY, &alias), value.clone());
        }
        synthetic.insert(combine(BASE_SECTION_KEY, &canonical), value);
    }
    let wrapped = LayeredConfig::from_providers(vec![Box::new(synthetic)]);
    bind_section(&wrapped, BASE_SECTION_KEY)
}
