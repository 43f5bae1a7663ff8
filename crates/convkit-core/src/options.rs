//! Option bags: the free-form settings passed alongside an input.
//!
//! Options stay loosely typed until an operation reads them. Each operation
//! declares the fields it understands on its descriptor; anything else in the
//! bag is ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// A single option value.
///
/// Deliberately a closed set: forms only ever submit strings, numbers and
/// checkbox states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl OptionValue {
    /// Parse a raw `key=value` right-hand side into the narrowest value kind.
    ///
    /// `true`/`false` become booleans, integers and floats become numbers,
    /// everything else stays a string.
    pub fn infer(raw: &str) -> Self {
        match raw {
            "true" => return OptionValue::Bool(true),
            "false" => return OptionValue::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return OptionValue::Int(n);
        }
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return OptionValue::Float(n);
            }
        }
        OptionValue::String(raw.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Floats are truncated, matching how number inputs
    /// arrive from sliders.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            OptionValue::Float(n) if n.is_finite() => Some(n.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Float(n) => write!(f, "{n}"),
            OptionValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(n as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Float(n)
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

/// Options for one conversion request, in submission order.
pub type Options = IndexMap<String, OptionValue>;

/// Extension trait for building and reading Options ergonomically.
pub trait OptionsExt {
    fn with(self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self;

    /// Boolean option, or `default` when absent or not a boolean.
    fn bool_or(&self, key: &str, default: bool) -> bool;

    /// Integer option clamped into `bounds`, or `default` when absent.
    fn int_in(&self, key: &str, default: i64, bounds: RangeInclusive<i64>) -> i64;

    /// String option, or `default` when absent or empty.
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;
}

impl OptionsExt for Options {
    fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(OptionValue::as_bool).unwrap_or(default)
    }

    fn int_in(&self, key: &str, default: i64, bounds: RangeInclusive<i64>) -> i64 {
        self.get(key)
            .and_then(OptionValue::as_i64)
            .unwrap_or(default)
            .clamp(*bounds.start(), *bounds.end())
    }

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key).and_then(OptionValue::as_str) {
            Some(s) if !s.is_empty() => s,
            _ => default,
        }
    }
}
