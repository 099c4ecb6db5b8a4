use std::fmt;

use serde::{Deserialize, Serialize};

/// A single typed scalar stored under a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
}

/// The type tag of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Int,
    UInt,
    Float,
    Double,
}

impl ValueKind {
    pub const ALL: [ValueKind; 5] = [
        ValueKind::String,
        ValueKind::Int,
        ValueKind::UInt,
        ValueKind::Float,
        ValueKind::Double,
    ];

    /// The tag character written in front of the payload (`i'42`).
    pub fn tag(self) -> char {
        match self {
            ValueKind::String => 's',
            ValueKind::Int => 'i',
            ValueKind::UInt => 'u',
            ValueKind::Float => 'f',
            ValueKind::Double => 'd',
        }
    }

    pub fn from_tag(tag: char) -> Option<ValueKind> {
        ValueKind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::String => "string",
            ValueKind::Int => "signed integer",
            ValueKind::UInt => "unsigned integer",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
        })
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Int(_) => ValueKind::Int,
            Value::UInt(_) => ValueKind::UInt,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        if let Value::Int(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        if let Value::UInt(n) = self {
            Some(*n)
        } else {
            None
        }
    }
}

/// Displays the bare payload, the same literal the codec writes after the tag.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(value.into())
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}
