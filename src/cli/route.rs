//! CLI route: single route table and run context. Dispatches to the resolver and presentation.

use crate::cli::output::{map_error, CommandOutput};
use crate::cli::parse::{Cli, Commands};
use crate::cli::presentation::{
    format_check_report, format_document_list, format_tree, format_value, CheckResult,
};
use crate::config::{Settings, SettingsLoader};
use crate::error::ConfigError;
use crate::loader::{DocumentEntry, DocumentLoader, FsLoader};
use crate::overrides::{apply_overrides, parse_overrides};
use crate::resolver::Resolver;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load settings for a CLI invocation: settings file (or layered sources), then CLI flags.
pub fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut settings = match cli.settings {
        Some(ref path) => SettingsLoader::load_from_file(path)?,
        None => SettingsLoader::load(&cli.workspace)?,
    };
    if let Some(ref dir) = cli.config_dir {
        settings.config_dir = dir.clone();
    }
    if !cli.search_path.is_empty() {
        settings.search_path = cli.search_path.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// Runtime context for CLI execution: workspace, settings and the document loader.
pub struct RunContext {
    workspace_root: PathBuf,
    settings: Settings,
    loader: FsLoader,
}

impl RunContext {
    /// Create run context from a workspace root and loaded settings.
    pub fn new(workspace_root: PathBuf, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let loader = settings.loader(&workspace_root);
        for root in loader.roots() {
            if !root.is_dir() {
                warn!(config_root = %root.display(), "Config root does not exist");
            }
        }
        Ok(Self {
            workspace_root,
            settings,
            loader,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn loader(&self) -> &FsLoader {
        &self.loader
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ConfigError> {
        let resolver = Resolver::new(&self.loader);
        match command {
            Commands::Resolve {
                name,
                overrides,
                format,
                raw,
            } => {
                let format = format.as_deref().unwrap_or(&self.settings.output_format);
                let overrides = parse_overrides(overrides)?;
                info!(document = %name, overrides = overrides.len(), raw = *raw, "Resolving");
                let text = if *raw {
                    let mut composition = resolver.compose(name)?;
                    apply_overrides(&mut composition.tree, &composition.package, &overrides)?;
                    format_tree(&composition.tree, format)?
                } else {
                    let resolved = resolver.resolve_with_overrides(name, &overrides)?;
                    format_tree(resolved.as_value(), format)?
                };
                Ok(CommandOutput::ok(text))
            }
            Commands::Get {
                name,
                key,
                overrides,
            } => {
                let overrides = parse_overrides(overrides)?;
                let resolved = resolver.resolve_with_overrides(name, &overrides)?;
                let value = resolved.get(key).ok_or_else(|| {
                    ConfigError::Output(format!("Key '{}' not found in '{}'", key, resolved.name()))
                })?;
                Ok(CommandOutput::ok(format_value(value)?))
            }
            Commands::List { group, format } => {
                let entries = self.documents_in(group.as_deref())?;
                Ok(CommandOutput::ok(format_document_list(&entries, format)?))
            }
            Commands::Check { names, group } => {
                let names: Vec<String> = if names.is_empty() {
                    self.documents_in(group.as_deref())?
                        .into_iter()
                        .map(|e| e.name)
                        .collect()
                } else {
                    names.clone()
                };
                let results: Vec<CheckResult> = names
                    .into_iter()
                    .map(|name| {
                        let outcome = resolver
                            .resolve(&name)
                            .map(|cfg| cfg.flatten().len())
                            .map_err(|e| map_error(&e));
                        debug!(document = %name, ok = outcome.is_ok(), "Checked document");
                        CheckResult { name, outcome }
                    })
                    .collect();
                let success = results.iter().all(|r| r.outcome.is_ok());
                let text = format_check_report(&results);
                Ok(if success {
                    CommandOutput::ok(text)
                } else {
                    CommandOutput::failed(text)
                })
            }
        }
    }

    fn documents_in(&self, group: Option<&str>) -> Result<Vec<DocumentEntry>, ConfigError> {
        let entries = self.loader.list()?;
        Ok(match group.map(|g| g.trim_matches('/')) {
            Some(group) if !group.is_empty() => entries
                .into_iter()
                .filter(|e| {
                    e.group() == group || e.group().starts_with(&format!("{}/", group))
                })
                .collect(),
            _ => entries,
        })
    }
}
