//! End-to-end layering tests over real files.
//!
//! Exercises the full composition path: a key-per-file secrets directory,
//! injected environment variables and arguments, a base JSON file, and an
//! environment-specific overlay, resolved through a single `LayeredConfig`.

use std::fs;
use std::path::Path;

use strata_config::{ComposeSettings, FlattenOptions, FlattenedEntry, SourceKind, compose};
use tempfile::TempDir;

fn platform_join(lines: &[&str]) -> String {
    let separator = if cfg!(windows) { "\r\n" } else { "\n" };
    lines.join(separator)
}

/// Secrets file `TestKey2` plus a JSON file whose `TestKey2` is an object.
fn scalar_vs_subtree_fixture() -> (TempDir, ComposeSettings) {
    let dir = TempDir::new().unwrap();
    let secrets = dir.path().join("secrets");
    fs::create_dir(&secrets).unwrap();
    fs::write(secrets.join("TestKey2"), "testVal2").unwrap();
    let app_settings = dir.path().join("appsettings.json");
    fs::write(
        &app_settings,
        r#"{"TestKey1": "testVal1", "TestKey2": {"TestKey3": "testVal3"}}"#,
    )
    .unwrap();
    let settings = ComposeSettings {
        secrets_dir: secrets,
        app_settings,
        ..ComposeSettings::default()
    };
    (dir, settings)
}

#[test]
fn scalar_and_subtree_under_the_same_name_coexist() {
    let (_dir, settings) = scalar_vs_subtree_fixture();
    let config = compose(&settings).unwrap();

    // The JSON layer turns TestKey2 into an internal node, so its flattened
    // leaf is TestKey2:TestKey3; the secrets scalar stays addressable at
    // TestKey2 because an internal node holds no value to shadow it with.
    assert_eq!(config.get("TestKey1"), Some("testVal1".to_owned()));
    assert_eq!(config.get("TestKey2"), Some("testVal2".to_owned()));
    assert_eq!(config.get("TestKey2:TestKey3"), Some("testVal3".to_owned()));
}

#[test]
fn flattening_lists_every_layer_without_deduplication() {
    let (_dir, settings) = scalar_vs_subtree_fixture();
    let config = compose(&settings).unwrap();

    let pairs = config.flatten_pairs(&FlattenOptions::default()).unwrap();
    let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
    // Secrets layer first, then the JSON layer; the empty environment and
    // argument layers contribute nothing.
    assert_eq!(keys, vec!["TestKey2", "TestKey1", "TestKey2:TestKey3"]);
}

#[test]
fn headers_and_render_follow_the_documented_format() {
    let (_dir, settings) = scalar_vs_subtree_fixture();
    let config = compose(&settings).unwrap();

    let options = FlattenOptions {
        include_headers: true,
        ..FlattenOptions::default()
    };
    let entries = config.flatten(&options).unwrap();
    assert!(matches!(
        entries.first(),
        Some(FlattenedEntry::Header {
            kind: SourceKind::SecretsDirectory,
            count: 1,
            ..
        })
    ));

    let rendered = config.render(&options).unwrap();
    let expected = platform_join(&[
        "",
        "secrets-directory [1 setting(s)]",
        "   [TestKey2]: testVal2",
        "",
        "json-file [2 setting(s)]",
        "   [TestKey1]: testVal1",
        "   [TestKey2:TestKey3]: testVal3",
    ]);
    assert_eq!(rendered, expected);
}

#[test]
fn later_layers_override_earlier_ones() {
    let dir = TempDir::new().unwrap();
    let secrets = dir.path().join("secrets");
    fs::create_dir(&secrets).unwrap();
    fs::write(secrets.join("Shared"), "fromSecrets").unwrap();
    let app_settings = dir.path().join("appsettings.json");
    fs::write(&app_settings, r#"{"Shared": "fromJson"}"#).unwrap();

    let settings = ComposeSettings {
        secrets_dir: secrets,
        app_settings,
        env_vars: vec![
            ("Shared".to_owned(), "fromEnv".to_owned()),
            ("EnvVsArgs".to_owned(), "fromEnv".to_owned()),
        ],
        args: vec!["--EnvVsArgs=fromArgs".to_owned()],
        ..ComposeSettings::default()
    };
    let config = compose(&settings).unwrap();

    // Full chain: secrets < env < args < base JSON.
    assert_eq!(config.get("Shared"), Some("fromJson".to_owned()));
    // Arguments outrank environment variables.
    assert_eq!(config.get("EnvVsArgs"), Some("fromArgs".to_owned()));
}

#[test]
fn environment_overlay_is_the_highest_layer() {
    let dir = TempDir::new().unwrap();
    let app_settings = dir.path().join("appsettings.json");
    fs::write(&app_settings, r#"{"Mode": "base", "Untouched": "kept"}"#).unwrap();
    fs::write(
        dir.path().join("appsettings.Production.json"),
        r#"{"Mode": "production"}"#,
    )
    .unwrap();

    let settings = ComposeSettings {
        secrets_dir: dir.path().join("no-secrets"),
        app_settings,
        env_vars: vec![("ENVIRONMENT".to_owned(), "Production".to_owned())],
        ..ComposeSettings::default()
    };
    let config = compose(&settings).unwrap();
    assert_eq!(config.get("Mode"), Some("production".to_owned()));
    assert_eq!(config.get("Untouched"), Some("kept".to_owned()));
}

#[test]
fn absent_backing_data_composes_to_empty_layers() {
    let dir = TempDir::new().unwrap();
    let settings = ComposeSettings {
        secrets_dir: dir.path().join("no-secrets"),
        app_settings: dir.path().join("missing.json"),
        ..ComposeSettings::default()
    };
    let config = compose(&settings).unwrap();

    // Env, args, base: present but empty. No secrets layer, no overlay.
    assert_eq!(config.len(), 3);
    assert_eq!(config.get("anything"), None);
    assert!(config.flatten_pairs(&FlattenOptions::default()).unwrap().is_empty());
    assert_eq!(config.render(&FlattenOptions::default()).unwrap(), "");
}

#[test]
fn overlay_selector_variable_is_itself_an_entry() {
    let dir = TempDir::new().unwrap();
    let settings = ComposeSettings {
        secrets_dir: dir.path().join("no-secrets"),
        app_settings: dir.path().join("missing.json"),
        env_vars: vec![("ENVIRONMENT".to_owned(), "Production".to_owned())],
        ..ComposeSettings::default()
    };
    let config = compose(&settings).unwrap();

    // The selector keeps the overlay layer in the stack even though the
    // overlay file is missing, and the variable itself stays visible in the
    // environment layer like any other entry.
    assert_eq!(config.len(), 4);
    assert_eq!(config.get("ENVIRONMENT"), Some("Production".to_owned()));

    let pairs = config.flatten_pairs(&FlattenOptions::default()).unwrap();
    let pairs: Vec<(&str, Option<&str>)> = pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_deref()))
        .collect();
    assert_eq!(pairs, vec![("ENVIRONMENT", Some("Production"))]);

    let options = FlattenOptions {
        include_headers: true,
        ..FlattenOptions::default()
    };
    let rendered = config.render(&options).unwrap();
    let expected = platform_join(&[
        "",
        "environment [1 setting(s)]",
        "   [ENVIRONMENT]: Production",
    ]);
    assert_eq!(rendered, expected);
}

#[test]
fn env_separator_normalization_reaches_nested_paths() {
    let settings = ComposeSettings {
        secrets_dir: Path::new("/nonexistent-secrets").to_path_buf(),
        app_settings: Path::new("/nonexistent/appsettings.json").to_path_buf(),
        env_vars: vec![("Logging__Level".to_owned(), "debug".to_owned())],
        ..ComposeSettings::default()
    };
    let config = compose(&settings).unwrap();
    assert_eq!(config.get("Logging:Level"), Some("debug".to_owned()));
}

#[test]
fn skip_kinds_hides_a_layer_from_flattening_but_not_lookup() {
    let (_dir, settings) = scalar_vs_subtree_fixture();
    let config = compose(&settings).unwrap();

    let options = FlattenOptions {
        skip_kinds: vec![SourceKind::SecretsDirectory],
        ..FlattenOptions::default()
    };
    let pairs = config.flatten_pairs(&options).unwrap();
    let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["TestKey1", "TestKey2:TestKey3"]);

    // Direct lookup still sees the skipped layer.
    assert_eq!(config.get("TestKey2"), Some("testVal2".to_owned()));
}
