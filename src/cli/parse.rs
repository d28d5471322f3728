//! CLI parse: clap types for hpxconf. No behavior; definitions only.

use crate::logging::{LogFormat, LogOutput};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hpxconf - compose and resolve DLWP HEALPix configuration documents
#[derive(Parser)]
#[command(name = "hpxconf")]
#[command(about = "Compose and resolve Hydra-style YAML configuration documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (settings file and relative config roots)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Settings file path (overrides default settings loading)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Config root directory (overrides settings)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Additional config root, searched after the primary one (repeatable)
    #[arg(long = "search-path")]
    pub search_path: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<LogOutput>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a config document and print the result
    Resolve {
        /// Document name relative to the config root (e.g. data/era5_hpx32_7var_6h_24h)
        name: String,
        /// Overrides: key=value, +key=value, ++key=value, ~key
        overrides: Vec<String>,
        /// Output format (yaml, json, flat); defaults to the settings value
        #[arg(long)]
        format: Option<String>,
        /// Print the merged document before interpolation
        #[arg(long)]
        raw: bool,
    },
    /// Print a single value of a resolved document
    Get {
        /// Document name
        name: String,
        /// Dotted key path (e.g. input_variables or data.nside)
        key: String,
        /// Overrides applied before lookup
        overrides: Vec<String>,
    },
    /// List available config documents
    List {
        /// Only documents in this group (e.g. data or data/scaling)
        group: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve documents and report failures
    Check {
        /// Documents to check; all documents (or all in --group) when omitted
        names: Vec<String>,
        /// Only check documents in this group
        #[arg(long)]
        group: Option<String>,
    },
}
