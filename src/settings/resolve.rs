//! The recursive directive resolution engine.
//!
//! Given a raw entry from the document, the resolver decides whether it is
//! a directive, a plain scalar, or a nested mapping requiring recursive
//! descent, and substitutes each directive node with its computed value.
//! Directive operands may themselves be directives and are resolved first.
//!
//! Resolution is idempotent on directive-free values, and directive
//! failures are never fatal: an unresolvable env lookup degrades to its
//! default (or null), an unknown poetry key contributes an empty string.

use super::directive::{Directive, classify};
use super::paths::rewrite_path;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// Tier names matched literally against environment-derived state
/// selection later in the pipeline. Never case-folded.
pub const RESERVED_TIER_KEYS: [&str; 3] = ["development", "docker", "production"];

/// Lookup scope for self-referential directives.
///
/// Holds the trimmed base-tier entries (normalized keys, unresolved
/// values) and the `[tool.poetry]` metadata table. Insert and poetry
/// lookups always read this base-tier scope, regardless of which tier is
/// currently being resolved.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl Scope {
    /// Build a scope from base-tier entries and package metadata.
    pub fn new(entries: Map<String, Value>, metadata: Map<String, Value>) -> Self {
        Self { entries, metadata }
    }

    /// Look up a base-tier entry by normalized key.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a package metadata field.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

/// Apply the case-folding policy to an output key.
///
/// Uppercases unless `upper` is false; reserved tier names pass through
/// unchanged so later tier selection can match them literally.
pub fn normalize_key(key: &str, upper: bool) -> String {
    if upper && !RESERVED_TIER_KEYS.contains(&key) {
        key.to_uppercase()
    } else {
        key.to_string()
    }
}

/// Insert `value` into the list bound to `key` in the base-tier scope,
/// or into an empty list if the key is absent.
///
/// Returns the resulting list without writing it back; the caller binds
/// it to the key. A `pos` of zero falls through to append — inherited
/// legacy behavior, pinned by tests (see `test_pos_zero_appends`).
/// Negative positions count from the end, clamped at the front.
pub fn insert_into_list(
    scope: &Scope,
    key: &str,
    value: Value,
    pos: Option<i64>,
) -> Vec<Value> {
    let mut items = match scope.entry(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };
    match pos.filter(|p| *p != 0) {
        Some(p) => {
            let idx = if p < 0 {
                items.len().saturating_sub(p.unsigned_abs() as usize)
            } else {
                (p as usize).min(items.len())
            };
            items.insert(idx, value);
        }
        None => items.push(value),
    }
    items
}

/// The recursive evaluator. Borrows its context for one resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    base_path: &'a Path,
    scope: &'a Scope,
    upper: bool,
}

impl<'a> Resolver<'a> {
    /// Create a resolver anchored at the document location.
    pub fn new(base_path: &'a Path, scope: &'a Scope, upper: bool) -> Self {
        Self {
            base_path,
            scope,
            upper,
        }
    }

    /// Resolve one entry, returning the normalized key and the fully
    /// substituted value.
    ///
    /// Scalars and sequences pass through verbatim; sequences are not
    /// recursed into. Mappings are either a directive (substituted with
    /// its computed value) or plain data (rebuilt key-by-key).
    pub fn resolve_entry(&self, key: &str, value: &Value) -> (String, Value) {
        let normalized = normalize_key(key, self.upper);
        let Value::Object(node) = value else {
            return (normalized, value.clone());
        };

        let resolved = match classify(node) {
            Some(Directive::Env { name, default }) => self.resolve_env(name, default),
            Some(Directive::Path { expr }) => {
                Value::String(rewrite_path(&self.stringify_operand(expr), self.base_path))
            }
            Some(Directive::Insert { value: item, pos }) => {
                let item = self.resolve_operand(item);
                let pos = pos.and_then(Value::as_i64);
                Value::Array(insert_into_list(self.scope, &normalized, item, pos))
            }
            Some(Directive::Concat { con, poetry, cat }) => {
                self.resolve_concat(con, poetry, cat)
            }
            None => {
                let mut rebuilt = Map::new();
                for (k, v) in node {
                    let (nk, nv) = self.resolve_entry(k, v);
                    rebuilt.insert(nk, nv);
                }
                Value::Object(rebuilt)
            }
        };
        (normalized, resolved)
    }

    /// Environment lookup: the variable's raw string value if set, else
    /// the resolved default, else null. Never fails.
    fn resolve_env(&self, name: &Value, default: Option<&Value>) -> Value {
        let name = self.stringify_operand(name);
        match std::env::var(&name) {
            Ok(value) => Value::String(value),
            Err(_) => match default {
                Some(default) => self.resolve_operand(default),
                None => Value::Null,
            },
        }
    }

    /// Concatenate the parts present, in fixed `con`, `poetry`, `cat`
    /// order, with no separator. The `poetry` part is a lookup into the
    /// package metadata table rather than a literal operand.
    fn resolve_concat(
        &self,
        con: Option<&Value>,
        poetry: Option<&Value>,
        cat: Option<&Value>,
    ) -> Value {
        let mut out = String::new();
        if let Some(part) = con {
            out.push_str(&self.stringify_operand(part));
        }
        if let Some(part) = poetry {
            out.push_str(&self.poetry_part(part));
        }
        if let Some(part) = cat {
            out.push_str(&self.stringify_operand(part));
        }
        Value::String(out)
    }

    /// Resolve a directive operand that may itself be a directive.
    fn resolve_operand(&self, value: &Value) -> Value {
        self.resolve_entry("", value).1
    }

    /// Resolve an operand and render it as a string fragment.
    fn stringify_operand(&self, value: &Value) -> String {
        if value.is_object() {
            stringify(&self.resolve_operand(value))
        } else {
            stringify(value)
        }
    }

    /// Look up a poetry metadata field for a concat part.
    fn poetry_part(&self, key: &Value) -> String {
        let Some(name) = key.as_str() else {
            warn!(?key, "poetry concat part is not a string key");
            return String::new();
        };
        match self.scope.metadata(name) {
            Some(value) => stringify(value),
            None => {
                warn!(name, "poetry metadata key not found");
                String::new()
            }
        }
    }
}

/// Render a resolved value as a string fragment for concatenation.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
