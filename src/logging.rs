//! Logging
//!
//! `tracing` subscriber setup for the CLI. Logs go to stderr by default so the document
//! printed on stdout stays machine-readable.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive taking precedence over the configured level and module levels.
pub const LOG_ENV: &str = "HPXCONF_LOG";
pub const LOG_FORMAT_ENV: &str = "HPXCONF_LOG_FORMAT";
pub const LOG_OUTPUT_ENV: &str = "HPXCONF_LOG_OUTPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("invalid log format '{}' (expected text or json)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stderr,
    Stdout,
    File,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stderr" => Ok(LogOutput::Stderr),
            "stdout" => Ok(LogOutput::Stdout),
            "file" => Ok(LogOutput::File),
            other => Err(format!(
                "invalid log output '{}' (expected stderr, stdout or file)",
                other
            )),
        }
    }
}

/// The `[logging]` table of the settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or off
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Used when `output` is `file`; defaults to [`default_log_file`].
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text output on a terminal stream.
    #[serde(default = "color_enabled")]
    pub color: bool,

    /// Per-module levels, e.g. `"hpxconf::resolver" = "trace"`.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_level() -> String {
    "warn".to_string()
}

fn color_enabled() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file: None,
            color: color_enabled(),
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Filter for the configured level plus module directives.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        let mut filter = EnvFilter::try_new(&self.level).map_err(|e| {
            ConfigError::Settings(format!("Invalid log level '{}': {}", self.level, e))
        })?;
        if self.level == "off" {
            return Ok(filter);
        }
        for (module, level) in &self.modules {
            let directive = format!("{}={}", module, level);
            let parsed = directive.parse().map_err(|e| {
                ConfigError::Settings(format!("Invalid log directive '{}': {}", directive, e))
            })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }

    /// Log file for `output = "file"`.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.file.clone().or_else(default_log_file)
    }

    /// Apply `HPXCONF_LOG_FORMAT` and `HPXCONF_LOG_OUTPUT`.
    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(raw) = std::env::var(LOG_FORMAT_ENV) {
            self.format = raw.parse().map_err(ConfigError::Settings)?;
        }
        if let Ok(raw) = std::env::var(LOG_OUTPUT_ENV) {
            self.output = raw.parse().map_err(ConfigError::Settings)?;
        }
        Ok(self)
    }

    fn make_writer(&self) -> Result<BoxMakeWriter, ConfigError> {
        Ok(match self.output {
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
            LogOutput::File => BoxMakeWriter::new(self.open_log_file()?),
        })
    }

    fn open_log_file(&self) -> Result<std::fs::File, ConfigError> {
        let path = self
            .log_file()
            .ok_or_else(|| ConfigError::Settings("No log file path available".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ConfigError::Io { path, source })
    }
}

/// `<state dir>/hpxconf.log`, falling back to the local data dir.
pub fn default_log_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hpxconf").map(|dirs| {
        dirs.state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .join("hpxconf.log")
    })
}

/// Install the global subscriber.
///
/// `HPXCONF_LOG` replaces the configured filter entirely; `HPXCONF_LOG_FORMAT` and
/// `HPXCONF_LOG_OUTPUT` replace the format and output.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let config = config.clone().with_env_overrides()?;
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };
    let ansi = config.color && config.output != LogOutput::File;

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(config.make_writer()?);
    let registry = Registry::default().with(filter);
    let result = match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => registry.with(layer.with_ansi(ansi)).try_init(),
    };

    result.map_err(|e| ConfigError::Settings(format!("Failed to initialize logging: {}", e)))
}
