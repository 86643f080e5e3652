//! # Macro Values
//!
//! Dynamic values bound to macro names at resolution time. Callers pass
//! text, numbers, and booleans interchangeably, so the value model is a
//! small sum type with an explicit string conversion per kind.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Bindings from macro name to value, supplied per resolution request.
///
/// Insertion order is irrelevant; the keys need not cover a superset of
/// the placeholders a document references, but any shortfall fails the
/// resolution.
pub type MacroBindings = HashMap<String, MacroValue>;

/// A value substitutable for a `{{macro}}` placeholder.
///
/// Variant order matters for untagged deserialization: booleans and
/// numbers are tried before falling back to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MacroValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MacroValue {
    /// The string-conversion contract: text inserts as-is, integers in
    /// decimal, floats with Rust's shortest round-trip formatting (so
    /// `42.0` renders as `42`), booleans as `true`/`false`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroValue::Bool(b) => write!(f, "{b}"),
            MacroValue::Integer(i) => write!(f, "{i}"),
            MacroValue::Float(x) => write!(f, "{x}"),
            MacroValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MacroValue {
    fn from(value: &str) -> Self {
        MacroValue::Text(value.to_string())
    }
}

impl From<String> for MacroValue {
    fn from(value: String) -> Self {
        MacroValue::Text(value)
    }
}

impl From<i64> for MacroValue {
    fn from(value: i64) -> Self {
        MacroValue::Integer(value)
    }
}

impl From<f64> for MacroValue {
    fn from(value: f64) -> Self {
        MacroValue::Float(value)
    }
}

impl From<bool> for MacroValue {
    fn from(value: bool) -> Self {
        MacroValue::Bool(value)
    }
}
