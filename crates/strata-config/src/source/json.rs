//! JSON file configuration source.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::key::{KeyPath, combine};
use crate::provider::{Provider, SourceKind};
use crate::source::EntryMap;

/// A source backed by a flattened JSON document.
///
/// The document root must be an object. Nested objects contribute path
/// segments, array elements contribute their zero-based index as a segment,
/// and scalars become leaf values rendered as strings. A JSON `null` records
/// the key with no value; an empty object or array contributes nothing.
#[derive(Debug, Default)]
pub struct JsonFileSource {
    entries: EntryMap,
}

impl JsonFileSource {
    /// Reads and flattens the JSON file at `path`.
    ///
    /// A missing file is an error unless `optional` is set, in which case it
    /// yields an empty source. A file that exists but does not parse is an
    /// error regardless of `optional`.
    pub fn load(path: &Path, optional: bool) -> ConfigResult<Self> {
        // Named to stay clear of the `display` helper the tracing macros
        // import into their expansion scope.
        let path_str = path.display().to_string();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) if source.kind() == io::ErrorKind::NotFound && optional => {
                tracing::debug!(path = %path_str, "optional json file not found, skipping");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path_str,
                    source,
                });
            }
        };
        let value: Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path_str.clone(),
                source,
            })?;
        if !value.is_object() {
            return Err(ConfigError::Parse {
                path: path_str,
                source: serde::de::Error::custom("expected a JSON object at the document root"),
            });
        }
        let mut entries = EntryMap::new();
        flatten_into(&value, "", &mut entries);
        tracing::debug!(path = %path_str, keys = entries.len(), "loaded json configuration file");
        Ok(Self { entries })
    }

    /// Number of flattened leaf entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the file contributed no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

fn flatten_into(value: &Value, prefix: &str, entries: &mut EntryMap) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(nested, &combine(prefix, key), entries);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(nested, &combine(prefix, &index.to_string()), entries);
            }
        }
        Value::Null => entries.insert(prefix.to_owned(), None),
        Value::Bool(flag) => entries.insert(prefix.to_owned(), Some(flag.to_string())),
        Value::Number(number) => entries.insert(prefix.to_owned(), Some(number.to_string())),
        Value::String(text) => entries.insert(prefix.to_owned(), Some(text.clone())),
    }
}

impl Provider for JsonFileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::JsonFile
    }

    fn child_keys(&self, parent: &KeyPath) -> Vec<String> {
        self.entries.child_keys(parent)
    }

    fn get(&self, key: &KeyPath) -> Option<String> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_json(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("appsettings.json");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn flattens_nested_objects_and_scalars() {
        let (_dir, path) = write_json(
            r#"{"TestKey1": "testVal1", "TestKey2": {"TestKey3": "testVal3"}, "Port": 8080, "Enabled": true}"#,
        );
        let source = JsonFileSource::load(&path, false).unwrap();
        assert_eq!(
            source.get(&KeyPath::from("TestKey1")),
            Some("testVal1".to_owned())
        );
        assert_eq!(
            source.get(&KeyPath::from("TestKey2:TestKey3")),
            Some("testVal3".to_owned())
        );
        assert_eq!(source.get(&KeyPath::from("Port")), Some("8080".to_owned()));
        assert_eq!(
            source.get(&KeyPath::from("Enabled")),
            Some("true".to_owned())
        );
        // The sub-object itself is an internal node, not a value.
        assert_eq!(source.get(&KeyPath::from("TestKey2")), None);
    }

    #[test]
    fn arrays_flatten_to_index_segments() {
        let (_dir, path) = write_json(r#"{"Hosts": ["alpha", "beta"]}"#);
        let source = JsonFileSource::load(&path, false).unwrap();
        assert_eq!(source.child_keys(&KeyPath::from("Hosts")), vec!["0", "1"]);
        assert_eq!(
            source.get(&KeyPath::from("Hosts:1")),
            Some("beta".to_owned())
        );
    }

    #[test]
    fn null_values_record_the_key_without_a_value() {
        let (_dir, path) = write_json(r#"{"Empty": null}"#);
        let source = JsonFileSource::load(&path, false).unwrap();
        assert_eq!(source.child_keys(&KeyPath::root()), vec!["Empty"]);
        assert_eq!(source.get(&KeyPath::from("Empty")), None);
    }

    #[test]
    fn empty_containers_contribute_nothing() {
        let (_dir, path) = write_json(r#"{"Obj": {}, "Arr": []}"#);
        let source = JsonFileSource::load(&path, false).unwrap();
        assert!(source.is_empty());
        assert!(source.child_keys(&KeyPath::root()).is_empty());
    }

    #[test]
    fn missing_optional_file_yields_empty_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let source = JsonFileSource::load(&path, true).unwrap();
        assert!(source.is_empty());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = JsonFileSource::load(&path, false).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_an_error_even_when_optional() {
        let (_dir, path) = write_json("{not valid json");
        let err = JsonFileSource::load(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn non_object_root_is_an_error() {
        let (_dir, path) = write_json(r#"["just", "an", "array"]"#);
        let err = JsonFileSource::load(&path, false).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
