//! Style descriptors attached to a font request.
//!
//! Settings keep insertion order. Cache keys are built by walking the
//! settings in that order, so `{weight, style}` and `{style, weight}`
//! produce different keys even with equal values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of descriptor name (`weight`, `style`, ...) to value
pub type Settings = IndexMap<String, SettingValue>;

/// A single descriptor value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean flag
    Bool(bool),
    /// Integer, e.g. a numeric weight
    Int(i64),
    /// Non-integer number
    Float(f64),
    /// Free-form string, e.g. `italic`
    Str(String),
    /// Explicit `null`, kept so it still contributes `_null` to the key
    Null,
}

impl SettingValue {
    /// Borrow as string if this is a string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer, parsing numeric strings
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for SettingValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}
