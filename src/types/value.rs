//! # Decoded Values
//!
//! [`Value`] is the reply-side representation of a decoded element. Integer
//! types widen to i64/u64, float32/float64 widen to f64, float80 keeps its
//! own wider carrier, and strings decode as the NUL-terminated prefix of
//! their slot.

use super::F80;
use std::fmt;

/// A single decoded element, widened to its reply-friendly form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    Float80(F80),
    Str(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Float80(f) => Some(f.to_f64()),
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Float80(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}
