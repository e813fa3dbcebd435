// File: src/interpreter/value.rs
//
// Runtime value types for Mini-PL.
// Values are 32-bit integers, strings or booleans. Operators convert their
// operands permissively: booleans count as 1/0, strings are parsed.

use crate::ast::ValueType;
use crate::errors::MiniPlError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Initial value of a variable declared without an initializer
    pub fn default_for(ty: ValueType) -> Self {
        match ty {
            ValueType::Int => Value::Int(0),
            ValueType::String => Value::Str(String::new()),
            ValueType::Bool => Value::Bool(false),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Str(_) => ValueType::String,
            Value::Bool(_) => ValueType::Bool,
        }
    }

    /// Integer view of the value; fails for text that is not a decimal number
    pub fn to_int(&self) -> Result<i32, Box<MiniPlError>> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Bool(b) => Ok(i32::from(*b)),
            Value::Str(s) => s.trim().parse::<i32>().map_err(|_| {
                Box::new(MiniPlError::type_error(format!("Cannot convert \"{}\" to int", s)))
            }),
        }
    }

    /// Boolean view of the value; fails for text other than true/false
    pub fn to_bool(&self) -> Result<bool, Box<MiniPlError>> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Box::new(MiniPlError::type_error(format!(
                    "Cannot convert \"{}\" to bool",
                    s
                )))),
            },
        }
    }

    /// Converts the value to the given declared type
    pub fn coerce(self, ty: ValueType) -> Result<Value, Box<MiniPlError>> {
        match ty {
            ValueType::Int => Ok(Value::Int(self.to_int()?)),
            ValueType::Bool => Ok(Value::Bool(self.to_bool()?)),
            ValueType::String => match self {
                Value::Str(s) => Ok(Value::Str(s)),
                other => Ok(Value::Str(other.to_string())),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_int_conversion() {
        assert_eq!(Value::Bool(true).to_int().unwrap(), 1);
        assert_eq!(Value::Bool(false).to_int().unwrap(), 0);
        assert_eq!(Value::Str(" 42 ".to_string()).to_int().unwrap(), 42);
        assert_eq!(Value::Str("-7".to_string()).to_int().unwrap(), -7);

        let err = Value::Str("abc".to_string()).to_int().unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn test_bool_conversion() {
        assert!(Value::Int(3).to_bool().unwrap());
        assert!(!Value::Int(0).to_bool().unwrap());
        assert!(Value::Str("True".to_string()).to_bool().unwrap());
        assert!(Value::Str("yes".to_string()).to_bool().is_err());
    }

    #[test]
    fn test_coerce_to_declared_type() {
        assert_eq!(Value::Int(5).coerce(ValueType::String).unwrap(), Value::Str("5".into()));
        assert_eq!(Value::Str("12".into()).coerce(ValueType::Int).unwrap(), Value::Int(12));
        assert_eq!(Value::Int(0).coerce(ValueType::Bool).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_display_and_defaults() {
        assert_eq!(Value::default_for(ValueType::Int).to_string(), "0");
        assert_eq!(Value::default_for(ValueType::String).to_string(), "");
        assert_eq!(Value::default_for(ValueType::Bool).to_string(), "false");
    }
}
