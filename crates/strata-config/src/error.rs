//! Configuration error types.

use thiserror::Error;

/// Errors produced while composing, flattening, or binding configuration.
///
/// Lookup misses are deliberately *not* errors anywhere in this crate: a key
/// with no value yields `None`, and an optional source whose backing data is
/// absent is skipped silently during composition.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file contained malformed JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path of the malformed file.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The binder was invoked without a configuration.
    #[error("no configuration supplied to bind")]
    MissingConfig,

    /// Traversal exceeded the configured maximum depth.
    ///
    /// Raised instead of silently truncating when a provider reports
    /// nesting deeper than the limit, which usually indicates a cyclic or
    /// pathological provider.
    #[error("key traversal exceeded depth limit {limit} at '{path}'")]
    DepthLimitExceeded {
        /// Path at which the limit was hit.
        path: String,
        /// The configured limit.
        limit: usize,
    },

    /// A configuration value could not convert to the requested field type.
    #[error("cannot convert '{value}' at key '{key}' to {expected}")]
    Conversion {
        /// Canonical key of the offending value.
        key: String,
        /// The target type's name.
        expected: &'static str,
        /// The string value that failed to convert.
        value: String,
    },

    /// Section binding failed for a reason reported by the deserializer.
    #[error("binding failed: {0}")]
    Bind(String),
}

impl serde::de::Error for ConfigError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Bind(msg.to_string())
    }
}

/// Convenience alias for results using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
