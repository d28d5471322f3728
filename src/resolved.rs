//! The immutable result of resolving a config document.

use crate::error::ConfigError;
use crate::value::{KeyPath, Mapping, Value};
use serde::de::DeserializeOwned;

/// Fully merged, fully interpolated configuration handed to downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    name: String,
    package: Vec<String>,
    root: Value,
    sources: Vec<String>,
}

impl ResolvedConfig {
    pub(crate) fn new(name: String, package: Vec<String>, root: Mapping, sources: Vec<String>) -> Self {
        Self {
            name,
            package,
            root: Value::Mapping(root),
            sources,
        }
    }

    /// Logical name of the root document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted package the root document is mounted at (`data` for `data/era5_hpx32`).
    pub fn package(&self) -> String {
        self.package.join(".")
    }

    /// Documents merged into this config, in merge order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn as_mapping(&self) -> &Mapping {
        match &self.root {
            Value::Mapping(map) => map,
            _ => unreachable!("resolved config root is always a mapping"),
        }
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_mapping().keys().map(String::as_str)
    }

    /// Look up a dotted path. A path may also be given with the package prefix
    /// (`data.nside` for the `data` package).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let key = KeyPath::parse(path).ok()?;
        if let Some(relative) = key.strip_prefix(&self.package) {
            if let Some(value) = self.root.get_path(relative.segments()) {
                return Some(value);
            }
        }
        self.root.get_path(key.segments())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    pub fn get_seq(&self, path: &str) -> Option<&[Value]> {
        self.get(path).and_then(Value::as_sequence)
    }

    /// Sequence of strings, e.g. `input_variables`.
    pub fn get_str_list(&self, path: &str) -> Option<Vec<&str>> {
        self.get_seq(path)?.iter().map(Value::as_str).collect()
    }

    /// Leaves as ordered `(dotted.key, value)` pairs.
    pub fn flatten(&self) -> Vec<(String, Value)> {
        self.root.flatten()
    }

    /// Deserialize the subtree at `path` into a typed value.
    pub fn extract<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self.get(path).ok_or_else(|| ConfigError::Output(format!(
            "key '{}' not found in '{}'",
            path, self.name
        )))?;
        from_value(value, path)
    }

    /// Deserialize the whole config into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        from_value(&self.root, &self.name)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.root).map_err(|e| ConfigError::Output(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

fn from_value<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, ConfigError> {
    serde_yaml::from_value(value.to_yaml_value())
        .map_err(|e| ConfigError::Output(format!("cannot deserialize '{}': {}", what, e)))
}
