/*!
 * Core data types for LabFlow.
 *
 * This module defines the value model used for instrument property reads
 * and writes throughout the LabFlow ecosystem.
 */
use std::fmt;

use serde::{Deserialize, Serialize};

/// A strongly-typed value exchanged with an instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if the value is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Check if the value is a float
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Check if the value is numeric (integer or float)
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if the value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if the value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Try to get a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get an integer value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) if *f == (*f as i64) as f64 => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get a float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get an array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Parse an instrument response into a value
    ///
    /// The response is trimmed of whitespace and message terminators, then
    /// interpreted as an integer if possible, a float otherwise, and kept
    /// as a string when it is neither.
    pub fn parse_scpi(response: &str) -> Value {
        let trimmed = response.trim().trim_end_matches(['\r', '\n', ';']);
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Value::Float(f);
        }
        Value::String(trimmed.to_string())
    }

    /// Render the value as ASCII suitable for a set command
    pub fn to_scpi(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => "0".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(a) => a
                .iter()
                .map(Value::to_scpi)
                .collect::<Vec<String>>()
                .join(","),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_scpi())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f as f64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_checks() {
        assert!(Value::Null.is_null());
        assert!(Value::Bool(true).is_bool());
        assert!(Value::Integer(42).is_integer());
        assert!(Value::Integer(42).is_numeric());
        assert!(Value::Float(3.14).is_float());
        assert!(Value::Float(3.14).is_numeric());
        assert!(Value::String("hello".to_string()).is_string());
        assert!(Value::Array(vec![Value::Integer(1)]).is_array());
    }

    #[test]
    fn test_value_conversions() {
        let v: Value = true.into();
        assert_eq!(v.as_bool(), Some(true));

        let v: Value = 42i32.into();
        assert_eq!(v.as_integer(), Some(42));

        let v: Value = 3.14f64.into();
        assert_eq!(v.as_float(), Some(3.14));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let array = vec![Value::Integer(1), Value::Integer(2)];
        let v: Value = array.clone().into();
        assert_eq!(v.as_array().unwrap(), &array[..]);
    }

    #[test]
    fn test_numeric_coercion() {
        let v = Value::Integer(42);
        assert_eq!(v.as_float(), Some(42.0));

        let v = Value::Float(3.0);
        assert_eq!(v.as_integer(), Some(3));

        let v = Value::Float(3.14);
        assert_eq!(v.as_integer(), None); // not an exact integer
    }

    #[test]
    fn test_parse_scpi() {
        assert_eq!(Value::parse_scpi("42\n"), Value::Integer(42));
        assert_eq!(Value::parse_scpi("-7"), Value::Integer(-7));
        assert_eq!(Value::parse_scpi("2.5E-3\r\n"), Value::Float(0.0025));
        assert_eq!(
            Value::parse_scpi("TEKTRONIX,TBS2204B,C012345,CF:91.1CT FV:1.04\n"),
            Value::String("TEKTRONIX,TBS2204B,C012345,CF:91.1CT FV:1.04".to_string())
        );
        assert_eq!(Value::parse_scpi("  \r\n"), Value::Null);
    }

    #[test]
    fn test_to_scpi() {
        assert_eq!(Value::Integer(4).to_scpi(), "4");
        assert_eq!(Value::Float(0.5).to_scpi(), "0.5");
        assert_eq!(Value::Bool(true).to_scpi(), "1");
        assert_eq!(Value::String("DC".to_string()).to_scpi(), "DC");
        assert_eq!(
            Value::Array(vec![Value::Integer(1), Value::Integer(2)]).to_scpi(),
            "1,2"
        );
    }
}
