//! Cross-source flattening and display rendering.
//!
//! Flattening visits each provider in layer order and lists its leaves with
//! their values. Entries stay grouped per provider and are deliberately not
//! deduplicated across providers: the output is a picture of every layer,
//! shadowed values included, which is what makes it useful for debugging
//! override problems.

use crate::error::ConfigResult;
use crate::key::KeyPath;
use crate::provider::{Provider, SourceKind};
use crate::traverse::{DEFAULT_MAX_DEPTH, discover};

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

/// Options controlling a flatten pass.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Source kinds to leave out entirely.
    pub skip_kinds: Vec<SourceKind>,
    /// Emit a synthetic header entry before each contributing provider.
    pub include_headers: bool,
    /// Depth bound handed to traversal.
    pub max_depth: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            skip_kinds: Vec::new(),
            include_headers: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One element of a flattened listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenedEntry {
    /// Synthetic marker preceding one provider's leaves.
    Header {
        /// Kind of the provider that follows.
        kind: SourceKind,
        /// Number of leaves the provider contributed.
        count: usize,
        /// Position of the provider in the composed layer list.
        provider_index: usize,
    },
    /// A single leaf and the value the owning provider reports for it.
    Leaf {
        /// Canonical leaf path.
        key: KeyPath,
        /// Value as stored in this provider; `None` when the key holds no
        /// scalar here.
        value: Option<String>,
        /// Position of the provider in the composed layer list.
        provider_index: usize,
    },
}

/// Flattens every provider into a grouped entry list.
///
/// Providers are visited in slice order. A provider whose kind appears in
/// `skip_kinds`, or which contributes no leaves, produces no entries at all.
pub fn flatten(
    providers: &[Box<dyn Provider>],
    options: &FlattenOptions,
) -> ConfigResult<Vec<FlattenedEntry>> {
    let mut entries = Vec::new();
    for (provider_index, provider) in providers.iter().enumerate() {
        let kind = provider.kind();
        if options.skip_kinds.contains(&kind) {
            tracing::debug!(kind = %kind, provider_index, "skipping provider kind");
            continue;
        }
        let leaves = discover(provider.as_ref(), &KeyPath::root(), options.max_depth)?;
        if leaves.is_empty() {
            continue;
        }
        if options.include_headers {
            entries.push(FlattenedEntry::Header {
                kind,
                count: leaves.len(),
                provider_index,
            });
        }
        for key in leaves {
            let value = provider.get(&key);
            entries.push(FlattenedEntry::Leaf {
                key,
                value,
                provider_index,
            });
        }
    }
    tracing::debug!(entries = entries.len(), "flattened provider layers");
    Ok(entries)
}

/// Flattens to plain `(key, value)` pairs, headers never included.
pub fn flatten_pairs(
    providers: &[Box<dyn Provider>],
    options: &FlattenOptions,
) -> ConfigResult<Vec<(KeyPath, Option<String>)>> {
    let pairs = flatten(providers, options)?
        .into_iter()
        .filter_map(|entry| match entry {
            FlattenedEntry::Leaf { key, value, .. } => Some((key, value)),
            FlattenedEntry::Header { .. } => None,
        })
        .collect();
    Ok(pairs)
}

/// Renders a flattened listing in its display form.
///
/// Leaves render as `   [<key>]: <value>` with a missing value rendered
/// empty; headers render as `<kind> [<N> setting(s)]` preceded by a blank
/// line. Lines join with the platform line terminator, and an empty listing
/// renders as the empty string.
#[must_use]
pub fn render(entries: &[FlattenedEntry]) -> String {
    let mut lines = Vec::new();
    for entry in entries {
        match entry {
            FlattenedEntry::Header { kind, count, .. } => {
                lines.push(String::new());
                lines.push(format!("{kind} [{count} setting(s)]"));
            }
            FlattenedEntry::Leaf { key, value, .. } => {
                lines.push(format!("   [{key}]: {}", value.as_deref().unwrap_or_default()));
            }
        }
    }
    lines.join(LINE_SEPARATOR)
}
