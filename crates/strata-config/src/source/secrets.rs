//! Key-per-file secrets directory source.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::key::KeyPath;
use crate::provider::{Provider, SourceKind};
use crate::source::EntryMap;

/// A source backed by a directory of secret files, one key per file.
///
/// Each regular file contributes its name as the key and its content as the
/// value. Symlinks are followed, so Kubernetes-style mounted secrets work;
/// directories and other non-regular entries are skipped. Values have
/// trailing whitespace trimmed on read unless [`raw_values`] is applied.
///
/// [`raw_values`]: SecretsDirSource::raw_values
#[derive(Debug)]
pub struct SecretsDirSource {
    entries: EntryMap,
    trim: bool,
}

impl SecretsDirSource {
    /// Reads every secret file under `dir`.
    ///
    /// The directory itself must exist and be listable; callers that want a
    /// missing directory to mean "no secrets" should check before calling.
    pub fn load(dir: &Path) -> ConfigResult<Self> {
        // Named to stay clear of the `display` helper the tracing macros
        // import into their expansion scope.
        let dir_str = dir.display().to_string();
        let mut entries = EntryMap::new();
        let listing = fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir_str.clone(),
            source,
        })?;
        for entry in listing {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: dir_str.clone(),
                source,
            })?;
            let path = entry.path();
            // Follows symlinks so mounted secrets resolve to their targets.
            let is_file = match fs::metadata(&path) {
                Ok(metadata) => metadata.is_file(),
                Err(_) => false,
            };
            if !is_file {
                tracing::debug!(path = %path.display(), "skipping non-regular secrets entry");
                continue;
            }
            let key = entry.file_name().to_string_lossy().into_owned();
            let value = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            entries.insert(key, Some(value));
        }
        tracing::debug!(path = %dir_str, keys = entries.len(), "loaded secrets directory");
        Ok(Self {
            entries,
            trim: true,
        })
    }

    /// Returns values exactly as stored on disk, trailing newline included.
    #[must_use]
    pub fn raw_values(mut self) -> Self {
        self.trim = false;
        self
    }

    /// Number of secret files read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory held no secret files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Provider for SecretsDirSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SecretsDirectory
    }

    fn child_keys(&self, parent: &KeyPath) -> Vec<String> {
        self.entries.child_keys(parent)
    }

    fn get(&self, key: &KeyPath) -> Option<String> {
        let value = self.entries.get(key)?;
        if self.trim {
            Some(value.trim_end().to_owned())
        } else {
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_one_key_per_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("TestKey2"), "testVal2\n").unwrap();
        fs::write(dir.path().join("ApiToken"), "s3cret").unwrap();
        let source = SecretsDirSource::load(dir.path()).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(
            source.child_keys(&KeyPath::root()),
            vec!["ApiToken", "TestKey2"]
        );
        assert_eq!(
            source.get(&KeyPath::from("ApiToken")),
            Some("s3cret".to_owned())
        );
    }

    #[test]
    fn trailing_whitespace_is_trimmed_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Token"), " padded \n").unwrap();
        let source = SecretsDirSource::load(dir.path()).unwrap();
        assert_eq!(source.get(&KeyPath::from("Token")), Some(" padded".to_owned()));
    }

    #[test]
    fn raw_values_keeps_content_verbatim() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Token"), "value\n").unwrap();
        let source = SecretsDirSource::load(dir.path()).unwrap().raw_values();
        assert_eq!(source.get(&KeyPath::from("Token")), Some("value\n".to_owned()));
    }

    #[test]
    fn subdirectories_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("Key"), "v").unwrap();
        let source = SecretsDirSource::load(dir.path()).unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.child_keys(&KeyPath::root()), vec!["Key"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("no-such-dir");
        let err = SecretsDirSource::load(&absent).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn empty_directory_yields_empty_source() {
        let dir = tempdir().unwrap();
        let source = SecretsDirSource::load(dir.path()).unwrap();
        assert!(source.is_empty());
    }
}
