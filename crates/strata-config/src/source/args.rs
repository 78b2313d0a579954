//! Command-line argument configuration source.

use crate::key::KeyPath;
use crate::provider::{Provider, SourceKind};
use crate::source::EntryMap;

/// Prefix marking an argument as a configuration flag.
const FLAG_PREFIX: &str = "--";

/// A source backed by command-line arguments.
///
/// Recognized forms are `--key=value` and `--key value`; after the leading
/// `--` the key is taken verbatim, so `--Logging:Level=debug` addresses a
/// nested path. A flag followed by another flag (or by nothing) records the
/// key with no value, and tokens without the `--` prefix are ignored.
#[derive(Debug, Default)]
pub struct CommandLineSource {
    entries: EntryMap,
}

impl CommandLineSource {
    /// Parses an explicit argument list. Pass arguments only, without the
    /// program name.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = EntryMap::new();
        let mut iter = args.into_iter().map(Into::into).peekable();
        while let Some(arg) = iter.next() {
            let Some(flag) = arg.strip_prefix(FLAG_PREFIX) else {
                tracing::debug!(arg = %arg, "ignoring non-flag argument");
                continue;
            };
            let (raw_key, value) = match flag.split_once('=') {
                Some((key, value)) => (key.to_owned(), Some(value.to_owned())),
                None => match iter.peek() {
                    Some(next) if !next.starts_with(FLAG_PREFIX) => {
                        let value = iter.next().unwrap_or_default();
                        (flag.to_owned(), Some(value))
                    }
                    _ => (flag.to_owned(), None),
                },
            };
            if raw_key.is_empty() {
                continue;
            }
            entries.insert(raw_key, value);
        }
        Self { entries }
    }

    /// Captures the current process arguments, skipping the program name.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_args(std::env::args().skip(1))
    }

    /// Number of parsed flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no flags were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Provider for CommandLineSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CommandLine
    }

    fn child_keys(&self, parent: &KeyPath) -> Vec<String> {
        self.entries.child_keys(parent)
    }

    fn get(&self, key: &KeyPath) -> Option<String> {
        self.entries.get(key)
    }
}
