//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ConfigError;

/// Map resolver/settings errors to a string for CLI output.
pub fn map_error(e: &ConfigError) -> String {
    match e {
        ConfigError::UnresolvedInterpolation { .. } | ConfigError::InvalidInterpolation { .. } => {
            format!("{}\n  hint: interpolation paths are dotted keys such as ${{data.nside}}", e)
        }
        ConfigError::DocumentNotFound(_) => {
            format!("{}\n  hint: run `hpxconf list` to see available documents", e)
        }
        _ => e.to_string(),
    }
}

/// Result of one CLI command: text to print and whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    pub fn ok(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }

    pub fn failed(text: String) -> Self {
        Self {
            text,
            success: false,
        }
    }
}
