//! Interpolation of `${...}` expressions
//!
//! Runs once, after composition and overrides, over the fully merged tree. A string that
//! is exactly one expression takes the referenced value with its type; a string with
//! surrounding text is rendered by concatenation.

use crate::error::ConfigError;
use crate::value::{KeyPath, Mapping, Value};
use tracing::trace;

/// Resolver prefix for environment lookups: `${oc.env:NAME}` or `${oc.env:NAME,default}`.
pub const ENV_RESOLVER: &str = "oc.env";

/// A parsed piece of a string leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Literal(String),
    Expr(String),
}

/// A parsed expression body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Path(KeyPath),
    Env { var: String, default: Option<String> },
}

/// Cheap check used to skip strings without expressions.
pub fn has_interpolation(s: &str) -> bool {
    s.contains("${")
}

/// Split a string into literal text and `${...}` expressions. `\${` is a literal `${`.
pub fn parse_template(s: &str) -> Result<Vec<Piece>, String> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = s;

    while let Some(pos) = rest.find("${") {
        if rest[..pos].ends_with('\\') {
            literal.push_str(&rest[..pos - 1]);
            literal.push_str("${");
            rest = &rest[pos + 2..];
            continue;
        }
        literal.push_str(&rest[..pos]);
        let body_start = pos + 2;
        let close = rest[body_start..]
            .find('}')
            .ok_or_else(|| "unterminated '${'".to_string())?;
        let body = &rest[body_start..body_start + close];
        if body.contains("${") {
            return Err("nested interpolation is not supported".to_string());
        }
        if body.trim().is_empty() {
            return Err("empty interpolation".to_string());
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(Piece::Expr(body.trim().to_string()));
        rest = &rest[body_start + close + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

/// Parse an expression body (the text between `${` and `}`).
pub fn parse_expr(body: &str) -> Result<Expr, String> {
    match body.split_once(':') {
        Some((resolver, args)) => {
            let resolver = resolver.trim();
            if resolver != ENV_RESOLVER {
                return Err(format!("unknown resolver '{}'", resolver));
            }
            let (var, default) = match args.split_once(',') {
                Some((var, default)) => (var.trim(), Some(unquote(default.trim()).to_string())),
                None => (args.trim(), None),
            };
            if var.is_empty() {
                return Err("'oc.env' needs a variable name".to_string());
            }
            Ok(Expr::Env {
                var: var.to_string(),
                default,
            })
        }
        None => KeyPath::parse(body).map(Expr::Path),
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

/// Evaluates every expression in a merged tree.
///
/// `package` is the dotted path the tree is mounted at in the global namespace. Path
/// expressions are tried against the global namespace first, then against the tree itself.
pub struct Interpolator<'a> {
    tree: &'a Value,
    package: &'a [String],
    document: &'a str,
    stack: Vec<KeyPath>,
}

impl<'a> Interpolator<'a> {
    pub fn new(tree: &'a Value, package: &'a [String], document: &'a str) -> Self {
        Self {
            tree,
            package,
            document,
            stack: Vec::new(),
        }
    }

    /// Produce a copy of the tree with every expression substituted.
    pub fn resolve_all(mut self) -> Result<Value, ConfigError> {
        let tree = self.tree;
        self.resolve_node(tree, &KeyPath::root())
    }

    fn resolve_node(&mut self, node: &Value, at: &KeyPath) -> Result<Value, ConfigError> {
        match node {
            Value::String(s) if has_interpolation(s) => self.resolve_string(s, at),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.resolve_node(item, &at.child(i.to_string())))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.resolve_node(child, &at.child(key.clone()))?);
                }
                Ok(Value::Mapping(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_string(&mut self, s: &str, at: &KeyPath) -> Result<Value, ConfigError> {
        if self.stack.contains(at) {
            let mut chain: Vec<String> = self.stack.iter().map(KeyPath::to_string).collect();
            chain.push(at.to_string());
            return Err(ConfigError::InterpolationCycle {
                document: self.document.to_string(),
                key: at.to_string(),
                chain,
            });
        }

        let pieces = parse_template(s).map_err(|reason| self.invalid(at, s, reason))?;
        self.stack.push(at.clone());
        let result = self.render(&pieces, s, at);
        self.stack.pop();
        result
    }

    fn render(&mut self, pieces: &[Piece], original: &str, at: &KeyPath) -> Result<Value, ConfigError> {
        if let [Piece::Expr(body)] = pieces {
            return self.evaluate(body, at);
        }
        let mut rendered = String::new();
        for piece in pieces {
            match piece {
                Piece::Literal(text) => rendered.push_str(text),
                Piece::Expr(body) => {
                    let value = self.evaluate(body, at)?;
                    let text = value.render_scalar().ok_or_else(|| {
                        self.invalid(
                            at,
                            original,
                            format!("cannot embed a {} in a string", value.type_name()),
                        )
                    })?;
                    rendered.push_str(&text);
                }
            }
        }
        Ok(Value::String(rendered))
    }

    fn evaluate(&mut self, body: &str, at: &KeyPath) -> Result<Value, ConfigError> {
        let expr = parse_expr(body).map_err(|reason| self.invalid(at, &format!("${{{}}}", body), reason))?;
        match expr {
            Expr::Path(path) => {
                let target = self
                    .locate(&path)
                    .ok_or_else(|| ConfigError::UnresolvedInterpolation {
                        document: self.document.to_string(),
                        key: at.to_string(),
                        expression: format!("${{{}}}", body),
                    })?;
                trace!(key = %at, target = %target, "Resolving interpolation");
                let tree = self.tree;
                match tree.get_path(target.segments()) {
                    Some(node) => self.resolve_node(node, &target),
                    None => Ok(Value::Null),
                }
            }
            Expr::Env { var, default } => match std::env::var(&var) {
                Ok(value) => Ok(Value::String(value)),
                Err(_) => match default {
                    Some(d) if d == "null" => Ok(Value::Null),
                    Some(d) => Ok(Value::String(d)),
                    None => Err(ConfigError::UnresolvedInterpolation {
                        document: self.document.to_string(),
                        key: at.to_string(),
                        expression: format!("${{{}}}", body),
                    }),
                },
            },
        }
    }

    /// Map an expression path to a path inside the tree.
    fn locate(&self, path: &KeyPath) -> Option<KeyPath> {
        if let Some(relative) = path.strip_prefix(self.package) {
            if self.tree.get_path(relative.segments()).is_some() {
                return Some(relative);
            }
        }
        if self.tree.get_path(path.segments()).is_some() {
            return Some(path.clone());
        }
        None
    }

    fn invalid(&self, at: &KeyPath, expression: &str, reason: String) -> ConfigError {
        ConfigError::InvalidInterpolation {
            document: self.document.to_string(),
            key: at.to_string(),
            expression: expression.to_string(),
            reason,
        }
    }
}
