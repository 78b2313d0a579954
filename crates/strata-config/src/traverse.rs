//! Hierarchical key discovery.
//!
//! Providers expose their data as a tree of named children; this module walks
//! that tree and reduces it to the set of leaf paths. The walk uses an
//! explicit work stack rather than call-stack recursion, so provider nesting
//! depth never threatens the thread stack, and a configurable depth bound
//! turns runaway structure into an error instead of an endless walk.

use std::collections::{BTreeSet, HashSet};

use crate::error::{ConfigError, ConfigResult};
use crate::key::KeyPath;
use crate::provider::Provider;

/// Default bound on nesting depth below the traversal root.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Collects every leaf path reachable beneath `root`, sorted.
///
/// A path with no children is a leaf; a path with children is internal and
/// never appears in the output, even when a scalar is also stored at it.
/// Each canonical path is visited at most once, so a provider reporting a
/// child segment twice contributes it once. A child more than `max_depth`
/// segments below `root` fails with [`ConfigError::DepthLimitExceeded`].
pub fn discover(
    provider: &dyn Provider,
    root: &KeyPath,
    max_depth: usize,
) -> ConfigResult<BTreeSet<KeyPath>> {
    let mut leaves = BTreeSet::new();
    let mut seen: HashSet<KeyPath> = HashSet::new();
    let mut stack: Vec<(KeyPath, usize)> = Vec::new();
    seen.insert(root.clone());
    stack.push((root.clone(), 0));

    while let Some((path, depth)) = stack.pop() {
        let child_depth = depth.saturating_add(1);
        for segment in provider.child_keys(&path) {
            let child = path.child(&segment);
            if child_depth > max_depth {
                return Err(ConfigError::DepthLimitExceeded {
                    path: child.to_string(),
                    limit: max_depth,
                });
            }
            if !seen.insert(child.clone()) {
                continue;
            }
            if provider.child_keys(&child).is_empty() {
                leaves.insert(child);
            } else {
                stack.push((child, child_depth));
            }
        }
    }
    Ok(leaves)
}
