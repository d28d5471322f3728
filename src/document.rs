//! Config documents
//!
//! A document is one YAML file: an optional `# @package` header, an optional `defaults`
//! list naming other documents to compose beneath it, and its own body of keys.

use crate::error::ConfigError;
use crate::value::{Mapping, Value};
use std::path::PathBuf;

/// Key holding the defaults list.
pub const DEFAULTS_KEY: &str = "defaults";

/// Defaults entry marking where the document's own body is merged.
pub const SELF_ENTRY: &str = "_self_";

/// Where a document's content lands relative to the document that pulls it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageDirective {
    /// Merged at the referencing document's level (`_here_`, or no directive).
    Here,
    /// Nested under the group name of the defaults entry (`_group_`).
    Group,
    /// Nested under an explicit dotted path.
    Path(Vec<String>),
}

/// One entry of a `defaults` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultEntry {
    /// `group: variant`, or `optional group: variant`.
    Group {
        group: String,
        variant: String,
        optional: bool,
    },
    /// `group: null`; the entry is disabled.
    Disabled { group: String },
    /// `override group: variant`; replaces the choice for `group` further down the tree.
    Override {
        group: String,
        variant: Option<String>,
    },
    /// A plain document name, looked up beside the referencing document.
    Named(String),
    /// `_self_`
    SelfBody,
}

/// Raw document text as handed over by a loader.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Logical name: slash-separated, no extension (`data/era5_hpx32`).
    pub name: String,
    pub text: String,
    /// File the text was read from, when it came from disk.
    pub origin: Option<PathBuf>,
}

/// A parsed config document, read-only once built.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    name: String,
    origin: Option<PathBuf>,
    package: PackageDirective,
    defaults: Vec<DefaultEntry>,
    body: Mapping,
}

impl ConfigDocument {
    /// Parse YAML text into a document.
    ///
    /// An empty file is an empty mapping. Anything other than a mapping at the top
    /// level is a `MalformedDocument` error.
    pub fn parse(name: &str, text: &str) -> Result<Self, ConfigError> {
        let package = parse_package_header(name, text)?;

        let raw: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| ConfigError::malformed(name, e.to_string()))?;
        let value = Value::try_from(raw).map_err(|e| ConfigError::malformed(name, e))?;

        let mut body = match value {
            Value::Null => Mapping::new(),
            Value::Mapping(map) => map,
            other => {
                return Err(ConfigError::malformed(
                    name,
                    format!("expected a mapping at the top level, found a {}", other.type_name()),
                ))
            }
        };

        let defaults = match body.shift_remove(DEFAULTS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| parse_default_entry(name, item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ConfigError::malformed(
                    name,
                    format!("'defaults' must be a list, found a {}", other.type_name()),
                ))
            }
        };

        let self_entries = defaults
            .iter()
            .filter(|entry| **entry == DefaultEntry::SelfBody)
            .count();
        if self_entries > 1 {
            return Err(ConfigError::malformed(
                name,
                "'_self_' may appear at most once in 'defaults'",
            ));
        }

        Ok(Self {
            name: name.to_string(),
            origin: None,
            package,
            defaults,
            body,
        })
    }

    /// Parse a document handed over by a loader, keeping its origin.
    pub fn from_loaded(loaded: LoadedDocument) -> Result<Self, ConfigError> {
        let mut doc = Self::parse(&loaded.name, &loaded.text)?;
        doc.origin = loaded.origin;
        Ok(doc)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Option<&PathBuf> {
        self.origin.as_ref()
    }

    pub fn package(&self) -> &PackageDirective {
        &self.package
    }

    pub fn defaults(&self) -> &[DefaultEntry] {
        &self.defaults
    }

    pub fn body(&self) -> &Mapping {
        &self.body
    }

    /// Directory part of the logical name (`data/era5` -> `data`, `era5` -> ``).
    pub fn group_dir(&self) -> &str {
        group_dir_of(&self.name)
    }

    /// Human-readable location for error messages: the file path when known.
    pub fn display_location(&self) -> String {
        match &self.origin {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }
}

/// Directory part of a logical document name.
pub fn group_dir_of(name: &str) -> &str {
    name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Normalize a user-supplied document name: drop extension, `./` and leading slashes.
pub fn normalize_name(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches("./").trim_start_matches('/');
    let without_ext = trimmed
        .strip_suffix(".yaml")
        .or_else(|| trimmed.strip_suffix(".yml"))
        .unwrap_or(trimmed);
    without_ext.replace('\\', "/")
}

fn parse_package_header(name: &str, text: &str) -> Result<PackageDirective, ConfigError> {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(comment) = line.strip_prefix('#') else {
            break;
        };
        let Some(directive) = comment.trim().strip_prefix("@package") else {
            continue;
        };
        let target = directive.trim();
        return match target {
            "" => Err(ConfigError::malformed(name, "'@package' directive without a target")),
            "_here_" => Ok(PackageDirective::Here),
            "_group_" => Ok(PackageDirective::Group),
            dotted => {
                let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
                if segments.iter().any(|s| s.is_empty()) {
                    return Err(ConfigError::malformed(
                        name,
                        format!("invalid '@package' target '{}'", dotted),
                    ));
                }
                Ok(PackageDirective::Path(segments))
            }
        };
    }
    Ok(PackageDirective::Here)
}

fn parse_default_entry(document: &str, item: &Value) -> Result<DefaultEntry, ConfigError> {
    match item {
        Value::String(s) if s == SELF_ENTRY => Ok(DefaultEntry::SelfBody),
        Value::String(s) if !s.trim().is_empty() => Ok(DefaultEntry::Named(s.trim().to_string())),
        Value::Mapping(map) if map.len() == 1 => {
            let (key, value) = map.iter().next().ok_or_else(|| {
                ConfigError::malformed(document, "empty defaults entry")
            })?;
            let (modifier, group) = match key.split_once(char::is_whitespace) {
                Some((modifier, group)) => (Some(modifier), group.trim()),
                None => (None, key.as_str()),
            };
            if group.is_empty() {
                return Err(ConfigError::malformed(
                    document,
                    format!("defaults entry '{}' has no group", key),
                ));
            }
            let group = group.to_string();
            let variant = match value {
                Value::Null => None,
                Value::String(s) => Some(normalize_name(s)),
                Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Bool(_) => {
                    value.render_scalar()
                }
                other => {
                    return Err(ConfigError::malformed(
                        document,
                        format!(
                            "defaults entry '{}' must name a variant, found a {}",
                            key,
                            other.type_name()
                        ),
                    ))
                }
            };
            match (modifier, variant) {
                (None, Some(variant)) => Ok(DefaultEntry::Group {
                    group,
                    variant,
                    optional: false,
                }),
                (Some("optional"), Some(variant)) => Ok(DefaultEntry::Group {
                    group,
                    variant,
                    optional: true,
                }),
                (None, None) | (Some("optional"), None) => Ok(DefaultEntry::Disabled { group }),
                (Some("override"), variant) => Ok(DefaultEntry::Override { group, variant }),
                (Some(other), _) => Err(ConfigError::malformed(
                    document,
                    format!("unknown defaults keyword '{}'", other),
                )),
            }
        }
        other => Err(ConfigError::malformed(
            document,
            format!(
                "defaults entries must be 'group: variant' or a name, found a {}",
                other.type_name()
            ),
        )),
    }
}
