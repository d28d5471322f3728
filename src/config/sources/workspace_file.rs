//! Workspace settings file source: hpxconf.toml in the workspace root.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;
use tracing::debug;

/// Settings file looked up in the workspace root.
pub const WORKSPACE_FILE_NAME: &str = "hpxconf.toml";

/// Add the workspace settings file to builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_root.join(WORKSPACE_FILE_NAME);
    if !path.is_file() {
        return Ok(builder);
    }
    debug!(settings_path = %path.display(), "Using workspace settings file");
    Ok(builder.add_source(File::from(path.as_path()).required(false)))
}
