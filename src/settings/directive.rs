//! Directive classification.
//!
//! A mapping node in the source document is a directive when its key set
//! matches exactly one reserved shape. Classification is key-set exact:
//! every key present must belong to the shape's required or optional set,
//! and the required subset must be present. Anything else is plain data
//! and gets recursed into key-by-key. The tolerant fallback is deliberate;
//! a mapping that merely resembles a directive must never misfire.

use serde_json::{Map, Value};

/// A classified directive node, borrowing its operand sub-nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive<'a> {
    /// `{env = "NAME"}` with optional `default` — environment lookup.
    Env {
        name: &'a Value,
        default: Option<&'a Value>,
    },
    /// `{path = "../relative/expr"}` — rewrite against the document location.
    Path { expr: &'a Value },
    /// `{insert = VALUE}` with optional `pos` — list insertion.
    Insert {
        value: &'a Value,
        pos: Option<&'a Value>,
    },
    /// Any non-empty subset of `con`, `poetry`, `cat` — concatenation.
    /// The `poetry` part is a lookup into the package metadata table.
    Concat {
        con: Option<&'a Value>,
        poetry: Option<&'a Value>,
        cat: Option<&'a Value>,
    },
}

/// Keys that may appear in a concat directive, in concatenation order.
const CONCAT_KEYS: [&str; 3] = ["con", "poetry", "cat"];

/// Classify a mapping node, or return `None` if it is plain data.
pub fn classify(node: &Map<String, Value>) -> Option<Directive<'_>> {
    if matches_shape(node, &["env"], &["default"]) {
        return Some(Directive::Env {
            name: &node["env"],
            default: node.get("default"),
        });
    }
    if matches_shape(node, &["path"], &[]) {
        return Some(Directive::Path { expr: &node["path"] });
    }
    if matches_shape(node, &["insert"], &["pos"]) {
        return Some(Directive::Insert {
            value: &node["insert"],
            pos: node.get("pos"),
        });
    }
    if !node.is_empty()
        && node.keys().all(|k| CONCAT_KEYS.contains(&k.as_str()))
    {
        return Some(Directive::Concat {
            con: node.get("con"),
            poetry: node.get("poetry"),
            cat: node.get("cat"),
        });
    }
    None
}

/// True when every required key is present and no key falls outside
/// the required and optional sets.
fn matches_shape(node: &Map<String, Value>, required: &[&str], optional: &[&str]) -> bool {
    required.iter().all(|k| node.contains_key(*k))
        && node
            .keys()
            .all(|k| required.contains(&k.as_str()) || optional.contains(&k.as_str()))
}
