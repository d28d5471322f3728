//! Resolved-document presentation: yaml, json and flat renderings, single values.

use crate::error::ConfigError;
use crate::value::Value;

/// Render a document tree in one of the output formats (yaml, json, flat).
pub fn format_tree(tree: &Value, format: &str) -> Result<String, ConfigError> {
    match format {
        "yaml" => serde_yaml::to_string(tree)
            .map(|s| s.trim_end().to_string())
            .map_err(|e| ConfigError::Output(e.to_string())),
        "json" => Ok(serde_json::to_string_pretty(tree)?),
        "flat" => {
            let lines: Vec<String> = tree
                .flatten()
                .into_iter()
                .map(|(key, value)| -> Result<String, ConfigError> {
                    Ok(format!("{}={}", key, format_flat_value(&value)?))
                })
                .collect::<Result<_, ConfigError>>()?;
            Ok(lines.join("\n"))
        }
        other => Err(ConfigError::Output(format!(
            "Unknown output format: {} (must be 'yaml', 'json', or 'flat')",
            other
        ))),
    }
}

fn format_flat_value(value: &Value) -> Result<String, ConfigError> {
    match value.render_scalar() {
        Some(text) => Ok(text),
        None => Ok(serde_json::to_string(value)?),
    }
}

/// Render one value for `hpxconf get`: scalars bare, collections as yaml.
pub fn format_value(value: &Value) -> Result<String, ConfigError> {
    match value.render_scalar() {
        Some(text) => Ok(text),
        None => format_tree(value, "yaml"),
    }
}
