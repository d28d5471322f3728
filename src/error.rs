//! Error types for configuration composition.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, composing, or interpolating configuration documents.
///
/// Every variant is fatal to the resolution call that produced it; no partial
/// result is ever returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing default '{group}: {variant}' referenced from '{referenced_from}'")]
    MissingDefault {
        group: String,
        variant: String,
        referenced_from: String,
    },

    #[error("Unresolved interpolation '{expression}' at key '{key}' in '{document}'")]
    UnresolvedInterpolation {
        document: String,
        key: String,
        expression: String,
    },

    #[error("Malformed document '{document}': {reason}")]
    MalformedDocument { document: String, reason: String },

    #[error("Config document not found: {0}")]
    DocumentNotFound(String),

    #[error("Defaults cycle detected: {}", chain.join(" -> "))]
    DefaultsCycle { chain: Vec<String> },

    #[error("Interpolation cycle at key '{key}' in '{document}': {}", chain.join(" -> "))]
    InterpolationCycle {
        document: String,
        key: String,
        chain: Vec<String>,
    },

    #[error("Invalid interpolation '{expression}' at key '{key}' in '{document}': {reason}")]
    InvalidInterpolation {
        document: String,
        key: String,
        expression: String,
        reason: String,
    },

    #[error("Invalid override '{raw}': {reason}")]
    InvalidOverride { raw: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl ConfigError {
    pub(crate) fn malformed(document: &str, reason: impl Into<String>) -> Self {
        ConfigError::MalformedDocument {
            document: document.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Settings(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Output(err.to_string())
    }
}
