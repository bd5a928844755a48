//! Value model for the sandbox.

use robogrid_lang::Const;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A runtime value inside the sandbox.
///
/// Objects keep insertion order so rendered output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Named member lookup; missing members read as null.
    pub fn member(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(fields) => Some(
                fields
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.clone())
                    .unwrap_or(Value::Null),
            ),
            Value::Array(items) if name == "length" => Some(Value::Num(items.len() as f64)),
            Value::Str(s) if name == "length" => Some(Value::Num(s.chars().count() as f64)),
            _ => None,
        }
    }

    /// The text a log line shows for this value: strings literally,
    /// other primitives as their literal text, aggregates as JSON.
    pub fn to_log_string(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => self.to_json().to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Num(n) => {
                // Integral numbers serialize without a fraction, like the
                // player-facing documentation shows.
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    serde_json::Value::Number(serde_json::Number::from(*n as i64))
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&Const> for Value {
    fn from(c: &Const) -> Self {
        match c {
            Const::Null => Value::Null,
            Const::Bool(b) => Value::Bool(*b),
            Const::Num(n) => Value::Num(*n),
            Const::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Num(n) => {
                // Integral values print without a trailing `.0`.
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => f.write_str(s),
            other => f.write_str(&other.to_json().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Num(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Num(-1.0).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn test_num_display() {
        assert_eq!(Value::Num(4.0).to_string(), "4");
        assert_eq!(Value::Num(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn test_log_rendering() {
        assert_eq!(Value::Str("hi".to_string()).to_log_string(), "hi");
        assert_eq!(Value::Num(3.0).to_log_string(), "3");
        let obj = Value::Object(vec![
            ("x".to_string(), Value::Num(1.0)),
            ("y".to_string(), Value::Num(2.0)),
        ]);
        assert_eq!(obj.to_log_string(), r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn test_member_lookup() {
        let obj = Value::Object(vec![("x".to_string(), Value::Num(1.0))]);
        assert_eq!(obj.member("x"), Some(Value::Num(1.0)));
        assert_eq!(obj.member("missing"), Some(Value::Null));
        assert_eq!(
            Value::Array(vec![Value::Null]).member("length"),
            Some(Value::Num(1.0))
        );
        assert_eq!(Value::Num(1.0).member("x"), None);
    }
}
