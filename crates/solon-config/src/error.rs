//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while layering or validating a [`SolonConfig`](crate::SolonConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("no configuration file at {path}")]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// A configuration file exists but could not be read.
    #[error("cannot read configuration file {path}")]
    Unreadable {
        /// The file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A TOML layer did not parse.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// A layer parsed but does not fit the configuration shape (unknown keys,
    /// wrong types).
    #[error("configuration shape mismatch: {0}")]
    Json(#[from] serde_json::Error),

    /// A layer was given in a format other than TOML or JSON.
    #[error("unsupported configuration format `{0}`")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the field, e.g. `dispatch.max_list_len`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An environment override did not parse.
    #[error("environment variable {var}: {reason}")]
    EnvVar {
        /// Full variable name.
        var: String,
        /// What is wrong with the value.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Creates an out-of-range error for `field`.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_var(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
