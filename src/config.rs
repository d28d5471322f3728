//! Tool settings
//!
//! Settings for hpxconf itself (where config documents live, default output format,
//! logging), layered with the `config` crate. Precedence, lowest to highest: built-in
//! defaults, global file, workspace file, `HPXCONF_*` environment, CLI flags (applied by
//! the caller).

use crate::error::ConfigError;
use crate::loader::FsLoader;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;
pub use sources::workspace_file::WORKSPACE_FILE_NAME;

/// Output formats understood by the CLI.
pub const OUTPUT_FORMATS: [&str; 3] = ["yaml", "json", "flat"];

/// Root settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Primary config root, relative to the workspace unless absolute
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Additional, lower-priority config roots
    #[serde(default)]
    pub search_path: Vec<PathBuf>,

    /// Default output format for `resolve`
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("conf")
}

fn default_output_format() -> String {
    "yaml".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            search_path: Vec::new(),
            output_format: default_output_format(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.config_dir.as_os_str().is_empty() {
            return Err(ConfigError::Settings("config_dir cannot be empty".to_string()));
        }
        if !OUTPUT_FORMATS.contains(&self.output_format.as_str()) {
            return Err(ConfigError::Settings(format!(
                "Invalid output_format: {} (must be one of {})",
                self.output_format,
                OUTPUT_FORMATS.join(", ")
            )));
        }
        Ok(())
    }

    /// Config roots in priority order, resolved against the workspace root.
    pub fn config_roots(&self, workspace_root: &Path) -> Vec<PathBuf> {
        std::iter::once(&self.config_dir)
            .chain(self.search_path.iter())
            .map(|dir| {
                let joined = if dir.is_absolute() {
                    dir.clone()
                } else {
                    workspace_root.join(dir)
                };
                dunce::canonicalize(&joined).unwrap_or(joined)
            })
            .collect()
    }

    /// Filesystem loader over [`Settings::config_roots`].
    pub fn loader(&self, workspace_root: &Path) -> FsLoader {
        FsLoader::with_search_path(self.config_roots(workspace_root))
    }
}

/// Loads [`Settings`] from all sources.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings for a workspace: defaults, global file, workspace file, environment.
    pub fn load(workspace_root: &Path) -> Result<Settings, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        debug!(config_dir = %settings.config_dir.display(), "Settings loaded");
        Ok(settings)
    }

    /// Load settings from one explicit file over the built-in defaults.
    pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::Settings(format!(
                "Settings file not found: {}",
                path.display()
            )));
        }
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path).required(true));
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
