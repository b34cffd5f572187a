#![forbid(unsafe_code)]

//! Copy-on-write value tree.
//!
//! [`Value`] is a JSON-shaped tree whose container children are
//! `Rc`-shared. Cloning an `Object` or `Array` clones one level of the
//! container and shares every child pointer, so rewriting a single path
//! through the tree leaves every untouched subtree referentially
//! identical (`Rc::ptr_eq`) to its pre-write self. Consumers that skip
//! work on reference equality stay correct across unrelated writes.
//!
//! # Equality
//!
//! `PartialEq` is structural, but container children compare by
//! `Rc::ptr_eq` first. Two trees that share subtrees (the common case
//! after a copy-on-write update) compare in time proportional to the
//! changed spine, not the whole tree.
//!
//! # Invariants
//!
//! 1. No `Value` is ever mutated in place once wrapped in an `Rc`; all
//!    updates build new spine nodes.
//! 2. `Object` keys iterate in sorted order (`BTreeMap`), so conversions
//!    and comparisons are deterministic.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::path::PathSeg;

/// A JSON-shaped value with `Rc`-shared container children.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number (stored as `f64`, matching the wire format).
    Number(f64),
    /// String.
    String(String),
    /// Array of shared children.
    Array(Vec<Rc<Value>>),
    /// Object with sorted keys and shared children.
    Object(BTreeMap<String, Rc<Value>>),
}

/// Structural equality with a pointer-identity fast path for shared
/// children.
fn child_eq(a: &Rc<Value>, b: &Rc<Value>) -> bool {
    Rc::ptr_eq(a, b) || a.as_ref() == b.as_ref()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| child_eq(x, y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && child_eq(va, vb))
            }
            _ => false,
        }
    }
}

impl Value {
    /// An empty object.
    #[must_use]
    pub fn object() -> Self {
        Value::Object(BTreeMap::new())
    }

    /// An empty array.
    #[must_use]
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Child at one path segment, if present.
    ///
    /// Key segments only resolve inside objects and index segments only
    /// inside arrays; any other combination yields `None`.
    #[must_use]
    pub fn child(&self, seg: &PathSeg) -> Option<&Rc<Value>> {
        match (self, seg) {
            (Value::Object(map), PathSeg::Key(k)) => map.get(k),
            (Value::Array(items), PathSeg::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// String payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload, if this is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Object map, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, Rc<Value>>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Array items, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Rc<Value>]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert from the serde_json representation used at the
    /// persistence boundary.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| Rc::new(Value::from_json(item)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Rc::new(Value::from_json(v))))
                    .collect(),
            ),
        }
    }

    /// Convert to the serde_json representation. Non-finite numbers
    /// become `null`, per the JSON data model.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(|item| item.to_json()).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
