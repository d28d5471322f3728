//! Environment source: HPXCONF_CONFIG_DIR, HPXCONF_SEARCH_PATH (comma separated),
//! HPXCONF_LOGGING__LEVEL and so on.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Prefix for settings environment variables.
pub const ENV_PREFIX: &str = "HPXCONF";

/// Add the environment source to builder. Highest precedence of the file-backed layers.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("search_path")
            .try_parsing(true),
    )
}
