//! Command-line style overrides: `key=value`, `+key=value`, `++key=value`, `~key`.
//!
//! Applied to the composed tree after defaults are merged and before interpolation, so an
//! override can itself contain `${...}` expressions.

use crate::error::ConfigError;
use crate::value::{KeyPath, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideOp {
    /// `key=value`: the key must already exist.
    Set,
    /// `+key=value`: the key must not exist yet.
    Add,
    /// `++key=value`: set whether or not the key exists.
    Upsert,
    /// `~key`: remove the key.
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub op: OverrideOp,
    pub key: KeyPath,
    pub value: Option<Value>,
    raw: String,
}

impl Override {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn error(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidOverride {
            raw: self.raw.clone(),
            reason: reason.into(),
        }
    }

    /// Path the key addresses in a tree mounted at `package`.
    ///
    /// A package-qualified key (`data.nside` under `data`) addresses the root-level key,
    /// unless only the qualified path exists in the tree.
    fn target(&self, tree: &Value, package: &[String]) -> KeyPath {
        match self.key.strip_prefix(package) {
            Some(relative) if tree.get_path(relative.segments()).is_some() => relative,
            Some(_) if tree.get_path(self.key.segments()).is_some() => self.key.clone(),
            Some(relative) => relative,
            None => self.key.clone(),
        }
    }

    /// Apply this override to a composed tree whose root document is mounted at `package`.
    pub fn apply(&self, tree: &mut Value, package: &[String]) -> Result<(), ConfigError> {
        let target = self.target(tree, package);
        let path = target.segments();
        let exists = tree.get_path(path).is_some();
        match self.op {
            OverrideOp::Delete => tree
                .remove_path(path)
                .map(|_| ())
                .ok_or_else(|| self.error(format!("key '{}' does not exist", self.key))),
            OverrideOp::Set if !exists => Err(self.error(format!(
                "key '{}' does not exist; use '+{}' to add it",
                self.key, self.raw
            ))),
            OverrideOp::Add if exists => Err(self.error(format!(
                "key '{}' already exists; use '+{}' to replace it",
                self.key, self.raw
            ))),
            OverrideOp::Set | OverrideOp::Add | OverrideOp::Upsert => {
                let value = self.value.clone().unwrap_or(Value::Null);
                tree.set_path(path, value).map_err(|reason| self.error(reason))
            }
        }
    }
}

impl FromStr for Override {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidOverride {
            raw: raw.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = raw.trim();

        if let Some(key) = trimmed.strip_prefix('~') {
            if key.contains('=') {
                return Err(invalid("delete overrides take no value"));
            }
            let key = parse_key(key).map_err(|reason| invalid(&reason))?;
            return Ok(Self {
                op: OverrideOp::Delete,
                key,
                value: None,
                raw: trimmed.to_string(),
            });
        }

        let (op, rest) = if let Some(rest) = trimmed.strip_prefix("++") {
            (OverrideOp::Upsert, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (OverrideOp::Add, rest)
        } else {
            (OverrideOp::Set, trimmed)
        };

        let (key, value) = rest
            .split_once('=')
            .ok_or_else(|| invalid("expected 'key=value'"))?;
        let key = parse_key(key).map_err(|reason| invalid(&reason))?;
        Ok(Self {
            op,
            key,
            value: Some(Value::parse_fragment(value)),
            raw: trimmed.to_string(),
        })
    }
}

fn parse_key(raw: &str) -> Result<KeyPath, String> {
    let key = KeyPath::parse(raw)?;
    if key.is_root() {
        return Err("missing key".to_string());
    }
    Ok(key)
}

/// Parse a list of raw override arguments.
pub fn parse_overrides<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Override>, ConfigError> {
    raw.iter().map(|s| s.as_ref().parse()).collect()
}

/// Apply overrides in order.
pub fn apply_overrides(
    tree: &mut Value,
    package: &[String],
    overrides: &[Override],
) -> Result<(), ConfigError> {
    for item in overrides {
        item.apply(tree, package)?;
    }
    Ok(())
}
