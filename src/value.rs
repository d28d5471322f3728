//! Configuration value tree
//!
//! Ordered mappings, sequences and scalars as they appear in a YAML config document,
//! with dotted-path lookup and the deep merge used when composing documents.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Ordered mapping; preserves the key order of the source document.
pub type Mapping = IndexMap<String, Value>;

/// A node in a configuration document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

/// Dotted key path such as `data.nside` or `splits.train.0`.
///
/// Numeric segments index into sequences; everywhere else segments are mapping keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dotted path. The empty string is the root path.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(format!("empty segment in key path '{}'", raw));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(format!("whitespace in key path '{}'", raw));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append one segment, returning the child path.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Strip `prefix` from the front of this path if it is a proper prefix.
    pub fn strip_prefix(&self, prefix: &[String]) -> Option<KeyPath> {
        if prefix.is_empty() || self.segments.len() <= prefix.len() {
            return None;
        }
        if self.segments[..prefix.len()] == *prefix {
            Some(KeyPath::from_segments(self.segments[prefix.len()..].to_vec()))
        } else {
            None
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl Value {
    /// An empty mapping, the value of an empty document.
    pub fn empty_mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a path below this node.
    pub fn get_path(&self, path: &[String]) -> Option<&Value> {
        let mut current = self;
        for segment in path {
            current = match current {
                Value::Mapping(map) => map.get(segment)?,
                Value::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn get_path_mut(&mut self, path: &[String]) -> Option<&mut Value> {
        let mut current = self;
        for segment in path {
            current = match current {
                Value::Mapping(map) => map.get_mut(segment)?,
                Value::Sequence(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set the value at `path`, creating intermediate mappings as needed.
    ///
    /// A null intermediate is replaced by a mapping. Fails when the path runs through a
    /// scalar or indexes past the end of a sequence.
    pub fn set_path(&mut self, path: &[String], value: Value) -> Result<(), String> {
        let Some((last, parents)) = path.split_last() else {
            *self = value;
            return Ok(());
        };
        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            if current.is_null() {
                *current = Value::empty_mapping();
            }
            current = match current {
                Value::Mapping(map) => map
                    .entry(segment.clone())
                    .or_insert_with(Value::empty_mapping),
                Value::Sequence(items) => {
                    let len = items.len();
                    let index = parse_index(segment, len)?;
                    &mut items[index]
                }
                other => {
                    return Err(format!(
                        "'{}' is a {}, not a mapping",
                        path[..=depth].join("."),
                        other.type_name()
                    ))
                }
            };
        }
        if current.is_null() {
            *current = Value::empty_mapping();
        }
        match current {
            Value::Mapping(map) => {
                map.insert(last.clone(), value);
                Ok(())
            }
            Value::Sequence(items) => {
                let len = items.len();
                let index = parse_index(last, len)?;
                items[index] = value;
                Ok(())
            }
            other => Err(format!(
                "'{}' is a {}, not a mapping",
                parents.join("."),
                other.type_name()
            )),
        }
    }

    /// Remove and return the value at `path`.
    pub fn remove_path(&mut self, path: &[String]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        match self.get_path_mut(parents)? {
            Value::Mapping(map) => map.shift_remove(last),
            Value::Sequence(items) => {
                let index = last.parse::<usize>().ok()?;
                (index < items.len()).then(|| items.remove(index))
            }
            _ => None,
        }
    }

    /// Deep merge `other` over `self`.
    ///
    /// Mappings merge key by key; any other pairing is replaced wholesale by `other`,
    /// including an explicit null.
    pub fn merge(&mut self, other: Value) {
        match (self, other) {
            (Value::Mapping(base), Value::Mapping(overlay)) => {
                for (key, value) in overlay {
                    match base.get_mut(&key) {
                        Some(existing) => existing.merge(value),
                        None => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (slot, other) => *slot = other,
        }
    }

    /// Wrap this value under a dotted package path (`a.b` -> `{a: {b: value}}`).
    pub fn nest_under(self, path: &[String]) -> Value {
        path.iter().rev().fold(self, |inner, segment| {
            let mut map = Mapping::new();
            map.insert(segment.clone(), inner);
            Value::Mapping(map)
        })
    }

    /// Text form of a scalar for string interpolation; `None` for collections.
    pub fn render_scalar(&self) -> Option<String> {
        match self {
            Value::Null => Some("null".to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::UInt(u) => Some(u.to_string()),
            Value::Float(f) => Some(render_float(*f)),
            Value::String(s) => Some(s.clone()),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }

    /// Leaves of this tree as ordered `(dotted.key, value)` pairs.
    ///
    /// Sequences and empty mappings are leaves; non-empty mappings are descended.
    pub fn flatten(&self) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        flatten_into(self, &mut Vec::new(), &mut out);
        out
    }

    /// Parse a YAML fragment (override values, env defaults). Unparseable text is a string.
    pub fn parse_fragment(text: &str) -> Value {
        if text.trim().is_empty() {
            return Value::String(text.to_string());
        }
        match serde_yaml::from_str::<serde_yaml::Value>(text) {
            Ok(parsed) => Value::try_from(parsed).unwrap_or_else(|_| Value::String(text.to_string())),
            Err(_) => Value::String(text.to_string()),
        }
    }

    /// Convert to a `serde_yaml::Value`, for emitting or typed deserialization.
    pub fn to_yaml_value(&self) -> serde_yaml::Value {
        match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Bool(b) => serde_yaml::Value::Bool(*b),
            Value::Int(i) => serde_yaml::Value::Number((*i).into()),
            Value::UInt(u) => serde_yaml::Value::Number((*u).into()),
            Value::Float(f) => serde_yaml::Value::Number((*f).into()),
            Value::String(s) => serde_yaml::Value::String(s.clone()),
            Value::Sequence(items) => {
                serde_yaml::Value::Sequence(items.iter().map(Value::to_yaml_value).collect())
            }
            Value::Mapping(map) => serde_yaml::Value::Mapping(
                map.iter()
                    .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.to_yaml_value()))
                    .collect(),
            ),
        }
    }
}

fn parse_index(segment: &str, len: usize) -> Result<usize, String> {
    let index = segment
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a sequence index", segment))?;
    if index >= len {
        return Err(format!(
            "index {} out of range for sequence of length {}",
            index, len
        ));
    }
    Ok(index)
}

fn flatten_into(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Mapping(map) if !map.is_empty() => {
            for (key, child) in map {
                prefix.push(key.clone());
                flatten_into(child, prefix, out);
                prefix.pop();
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.push((prefix.join("."), leaf.clone()));
            }
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    return Err(format!("unsupported number {}", n));
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(mapping_key(key)?, Value::try_from(value)?);
                }
                Value::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

/// YAML spelling of a float: `1.0` keeps its fraction, non-finite values use `.nan`/`.inf`.
fn render_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

fn mapping_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => Err(format!("unsupported mapping key: {:?}", other)),
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(u),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
