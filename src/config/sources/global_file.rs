//! Global settings file source: $XDG_CONFIG_HOME/hpxconf/config.toml (platform config dir).

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Path to the global settings file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hpxconf").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add global settings file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(global_path) = global_config_path() {
        if global_path.is_file() {
            let canonical = dunce::canonicalize(&global_path).unwrap_or(global_path);
            debug!(settings_path = %canonical.display(), "Using global settings file");
            builder = builder.add_source(File::from(canonical.as_path()).required(false));
        } else {
            debug!(
                settings_path = %global_path.display(),
                "No global settings file; using defaults"
            );
        }
    }
    Ok(builder)
}
