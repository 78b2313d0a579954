#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for Strata services.
//!
//! This crate composes configuration from several sources into a single
//! [`LayeredConfig`], flattens the result for inspection, and binds sections
//! of it onto plain Rust types.
//!
//! # Usage
//!
//! ```rust,no_run
//! use strata_config::{ComposeSettings, FlattenOptions};
//!
//! // Compose the standard layer stack from ambient process state.
//! let settings = ComposeSettings::from_process();
//! let config = strata_config::compose(&settings).unwrap();
//! let options = FlattenOptions {
//!     include_headers: true,
//!     ..FlattenOptions::default()
//! };
//! println!("{}", config.render(&options).unwrap());
//! ```
//!
//! # Layer Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment overlay** (`appsettings.<ENVIRONMENT>.json`)
//! 2. **Base settings file** (`appsettings.json`)
//! 3. **Command-line arguments** (`--key=value`)
//! 4. **Environment variables** (`SECTION__KEY` normalizes to `SECTION:KEY`)
//! 5. **Secrets directory** (`/etc/secrets`, one file per key)
//!
//! # Design
//!
//! Sources never read ambient process state on their own; environment
//! variables and arguments are passed in through [`ComposeSettings`], which
//! keeps composition deterministic under test. Provider trees are walked
//! iteratively with a depth bound, so a misbehaving source surfaces as a
//! [`ConfigError`] instead of a stack overflow.

/// Cross-source flattening and display rendering.
pub mod aggregate;
/// Typed section binding.
pub mod bind;
/// Fixed source composition and the layered configuration.
pub mod compose;
/// Configuration error types.
pub mod error;
/// Canonical key paths.
pub mod key;
/// The source abstraction.
pub mod provider;
/// Concrete configuration sources.
pub mod source;
/// Hierarchical key discovery.
pub mod traverse;

// Re-export the primary surface at the crate root.
pub use aggregate::{FlattenOptions, FlattenedEntry, flatten, flatten_pairs, render};
pub use bind::{BASE_SECTION_KEY, bind_base_section, bind_section};
pub use compose::{
    ComposeSettings, DEFAULT_APP_SETTINGS, DEFAULT_ENVIRONMENT_VAR, DEFAULT_SECRETS_DIR,
    LayeredConfig, compose,
};
pub use error::{ConfigError, ConfigResult};
pub use key::{KEY_SEPARATOR, KeyPath, combine};
pub use provider::{Provider, SourceKind};
pub use source::{CommandLineSource, EnvSource, JsonFileSource, MemorySource, SecretsDirSource};
pub use traverse::{DEFAULT_MAX_DEPTH, discover};
