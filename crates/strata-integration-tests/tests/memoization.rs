//! Caching bound configuration with the TTL cache.
//!
//! Composition is one-shot at startup, but services that re-resolve settings
//! on demand (per request, per tenant) sit a `TtlCache` in front of the
//! compose-and-bind path. These tests exercise that seam across both crates.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Deserialize;
use strata_cache::TtlCache;
use strata_config::{ComposeSettings, ConfigError, compose};
use tempfile::TempDir;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Service {
    name: String,
    port: u16,
}

fn settings_for(dir: &TempDir) -> ComposeSettings {
    ComposeSettings {
        secrets_dir: dir.path().join("no-secrets"),
        app_settings: dir.path().join("appsettings.json"),
        ..ComposeSettings::default()
    }
}

#[test]
fn bound_settings_are_composed_once_per_ttl_window() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("appsettings.json"),
        r#"{"Name": "strata", "Port": 7000}"#,
    )
    .unwrap();

    let cache: TtlCache<Service> = TtlCache::new();
    let composes = AtomicUsize::new(0);
    let resolve = || -> Result<Service, ConfigError> {
        composes.fetch_add(1, Ordering::SeqCst);
        compose(&settings_for(&dir))?.bind_base_section()
    };

    let first = cache
        .get_or_build("service", Duration::from_secs(60), resolve)
        .unwrap();
    let second = cache
        .get_or_build("service", Duration::from_secs(60), || {
            composes.fetch_add(1, Ordering::SeqCst);
            compose(&settings_for(&dir))?.bind_base_section()
        })
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first,
        Service {
            name: "strata".to_owned(),
            port: 7000,
        }
    );
    assert_eq!(composes.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_binds_are_not_cached_so_fixes_take_effect() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appsettings.json");
    fs::write(&path, r#"{"Name": "strata", "Port": "broken"}"#).unwrap();

    let cache: TtlCache<Service> = TtlCache::new();
    let resolve = || compose(&settings_for(&dir))?.bind_base_section::<Service>();

    let err = cache
        .get_or_build("service", Duration::from_secs(60), resolve)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Conversion { .. }));
    assert!(!cache.contains("service"));

    // Fix the file; the next resolution builds from the corrected source.
    fs::write(&path, r#"{"Name": "strata", "Port": 7001}"#).unwrap();
    let service = cache
        .get_or_build("service", Duration::from_secs(60), resolve)
        .unwrap();
    assert_eq!(service.port, 7001);
}
