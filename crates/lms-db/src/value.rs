//! Backend-agnostic database values.
//!
//! [`Value`] is what query parameters are bound from and what result rows are
//! decoded into. It only covers the column types the LMS tables use.

use std::fmt;

use lms_core::LmsError;

/// A backend-agnostic representation of a database value.
///
/// # Examples
///
/// ```
/// use lms_db::value::Value;
///
/// assert_eq!(Value::from(42_i64), Value::Int(42));
/// assert_eq!(Value::from("course-v1:Org+CS101+2024"), Value::String("course-v1:Org+CS101+2024".to_string()));
/// assert_eq!(Value::from(None::<f64>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
}

impl Value {
    /// Returns `true` for SQL NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ── Decoding ───────────────────────────────────────────────────────────

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> Result<Self, LmsError>;
}

fn type_mismatch(expected: &str, value: &Value) -> LmsError {
    LmsError::DatabaseError(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, LmsError> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(type_mismatch("Int", value)),
        }
    }
}

impl FromValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Result<Self, LmsError> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(type_mismatch("Float", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, LmsError> {
        match value {
            Value::Bool(b) => Ok(*b),
            // SQLite has no boolean storage class.
            Value::Int(i) => Ok(*i != 0),
            _ => Err(type_mismatch("Bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, LmsError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(type_mismatch("String", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, LmsError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, LmsError> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(7).to_string(), "7");
        assert_eq!(Value::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(Some(0.5)), Value::Float(0.5));
        assert!(Value::from(None::<i64>).is_null());
    }

    #[test]
    fn test_decode_int_as_float_and_bool() {
        assert!((f64::from_value(&Value::Int(3)).unwrap() - 3.0).abs() < f64::EPSILON);
        assert!(bool::from_value(&Value::Int(1)).unwrap());
        assert!(!bool::from_value(&Value::Int(0)).unwrap());
    }

    #[test]
    fn test_decode_option() {
        assert_eq!(Option::<f64>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::Int(2)).unwrap(), Some(2));
    }

    #[test]
    fn test_decode_mismatch() {
        let err = i64::from_value(&Value::from("x")).unwrap_err();
        assert!(matches!(err, LmsError::DatabaseError(_)));
        assert!(String::from_value(&Value::Int(1)).is_err());
    }
}
