//! Fixed source composition.
//!
//! [`compose`] assembles the standard layer stack for a service process:
//! secrets directory, then environment variables, then command-line
//! arguments, then the base JSON file, then an environment-specific JSON
//! overlay. Later layers override earlier ones. Process state (environment
//! variables, arguments) is passed in explicitly through
//! [`ComposeSettings`], which keeps composition deterministic and testable;
//! [`ComposeSettings::from_process`] captures the ambient state for
//! production use.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::aggregate::{self, FlattenOptions, FlattenedEntry};
use crate::bind;
use crate::error::ConfigResult;
use crate::key::KeyPath;
use crate::provider::Provider;
use crate::source::{CommandLineSource, EnvSource, JsonFileSource, SecretsDirSource};

/// Default secrets directory mounted by the deployment platform.
pub const DEFAULT_SECRETS_DIR: &str = "/etc/secrets";
/// Default base settings file, resolved against the working directory.
pub const DEFAULT_APP_SETTINGS: &str = "appsettings.json";
/// Environment variable naming the deployment environment.
pub const DEFAULT_ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Inputs to [`compose`].
#[derive(Debug, Clone)]
pub struct ComposeSettings {
    /// Directory of key-per-file secrets, skipped when absent.
    pub secrets_dir: PathBuf,
    /// Base JSON settings file, loaded as optional.
    pub app_settings: PathBuf,
    /// Name of the variable that selects the overlay file.
    pub environment_var: String,
    /// Environment variables visible to composition.
    pub env_vars: Vec<(String, String)>,
    /// Command-line arguments visible to composition, program name excluded.
    pub args: Vec<String>,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            secrets_dir: PathBuf::from(DEFAULT_SECRETS_DIR),
            app_settings: PathBuf::from(DEFAULT_APP_SETTINGS),
            environment_var: DEFAULT_ENVIRONMENT_VAR.to_owned(),
            env_vars: Vec::new(),
            args: Vec::new(),
        }
    }
}

impl ComposeSettings {
    /// Captures the current process environment and arguments.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
            args: std::env::args().skip(1).collect(),
            ..Self::default()
        }
    }

    /// The overlay-selecting environment value, if set.
    fn environment(&self) -> Option<&str> {
        self.env_vars
            .iter()
            .rev()
            .find(|(name, _)| *name == self.environment_var)
            .map(|(_, value)| value.as_str())
    }
}

/// Builds the fixed layer stack described by `settings`.
///
/// Every layer is optional in the sense that absent backing data yields an
/// empty layer (or no layer at all for the secrets directory); only files
/// that exist but cannot be read or parsed produce errors.
pub fn compose(settings: &ComposeSettings) -> ConfigResult<LayeredConfig> {
    let mut config = LayeredConfig::new();

    if settings.secrets_dir.is_dir() {
        let secrets = SecretsDirSource::load(&settings.secrets_dir)?;
        tracing::info!(
            path = %settings.secrets_dir.display(),
            keys = secrets.len(),
            "loaded secrets directory"
        );
        config.push(Box::new(secrets));
    } else {
        tracing::debug!(
            path = %settings.secrets_dir.display(),
            "secrets directory not found, skipping"
        );
    }

    config.push(Box::new(EnvSource::from_vars(settings.env_vars.iter().cloned())));
    config.push(Box::new(CommandLineSource::from_args(settings.args.iter().cloned())));
    config.push(Box::new(JsonFileSource::load(&settings.app_settings, true)?));

    if let Some(environment) = settings.environment() {
        if !environment.is_empty() {
            let path = overlay_path(&settings.app_settings, environment);
            config.push(Box::new(JsonFileSource::load(&path, true)?));
        }
    }

    tracing::info!(layers = config.len(), "composed configuration layers");
    Ok(config)
}

/// Overlay file beside `base`, named `<stem>.<environment>.<ext>`.
fn overlay_path(base: &Path, environment: &str) -> PathBuf {
    let stem = base.file_stem().and_then(OsStr::to_str).unwrap_or_default();
    match base.extension().and_then(OsStr::to_str) {
        Some(ext) => base.with_file_name(format!("{stem}.{environment}.{ext}")),
        None => base.with_file_name(format!("{stem}.{environment}")),
    }
}

/// An ordered stack of configuration layers.
///
/// Provider order is layer order: the later a provider sits in the stack,
/// the higher its priority when [`get`](LayeredConfig::get) resolves a key.
#[derive(Default)]
pub struct LayeredConfig {
    providers: Vec<Box<dyn Provider>>,
}

impl fmt::Debug for LayeredConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.providers.iter().map(|p| p.kind()).collect();
        f.debug_struct("LayeredConfig").field("layers", &kinds).finish()
    }
}

impl LayeredConfig {
    /// A configuration with no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-ordered provider stack.
    #[must_use]
    pub fn from_providers(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Appends `provider` as the new highest-priority layer.
    pub fn push(&mut self, provider: Box<dyn Provider>) {
        self.providers.push(provider);
    }

    /// The layers in priority order, lowest first.
    #[must_use]
    pub fn providers(&self) -> &[Box<dyn Provider>] {
        &self.providers
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the stack holds no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The effective value for `key`.
    ///
    /// Layers are scanned from highest priority down; the first layer that
    /// reports a value wins. A layer that merely knows the key without a
    /// value does not shadow a lower layer's value. An empty `key` addresses
    /// the root path and misses normally.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let path = KeyPath::from(key);
        self.providers
            .iter()
            .rev()
            .find_map(|provider| provider.get(&path))
    }

    /// Distinct root-level child segments across all layers, in layer order.
    #[must_use]
    pub fn root_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for provider in &self.providers {
            for segment in provider.child_keys(&KeyPath::root()) {
                if seen.insert(segment.clone()) {
                    keys.push(segment);
                }
            }
        }
        keys
    }

    /// Flattens every layer into a grouped entry list.
    pub fn flatten(&self, options: &FlattenOptions) -> ConfigResult<Vec<FlattenedEntry>> {
        aggregate::flatten(&self.providers, options)
    }

    /// Flattens to plain `(key, value)` pairs.
    pub fn flatten_pairs(
        &self,
        options: &FlattenOptions,
    ) -> ConfigResult<Vec<(KeyPath, Option<String>)>> {
        aggregate::flatten_pairs(&self.providers, options)
    }

    /// Flattens and renders the display listing.
    pub fn render(&self, options: &FlattenOptions) -> ConfigResult<String> {
        Ok(aggregate::render(&self.flatten(options)?))
    }

    /// Binds the subtree beneath `section` into `T`.
    pub fn bind_section<T: DeserializeOwned>(&self, section: &str) -> ConfigResult<T> {
        bind::bind_section(self, section)
    }

    /// Binds the root-level scalars into `T` through the synthetic base
    /// section.
    pub fn bind_base_section<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        bind::bind_base_section(Some(self))
    }
}
