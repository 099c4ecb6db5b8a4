// Author: Dustin Pilgrim
// License: MIT

use indexmap::IndexMap;
use serde::Deserialize;

use super::Section;
use crate::ast::{Value, ValueKind};
use crate::resolver;
use crate::XclError;

/// Serialized shape of a [`Section`]. A child's name lives only in its
/// parent's map key.
#[derive(Deserialize)]
pub(super) struct SectionRepr {
    #[serde(default)]
    attributes: IndexMap<String, Value>,
    #[serde(default)]
    sections: IndexMap<String, Section>,
}

impl TryFrom<SectionRepr> for Section {
    type Error = XclError;

    /// Rebuild a root from its serialized shape, rejecting names the text
    /// format could not express. The result starts dirty.
    fn try_from(repr: SectionRepr) -> Result<Self, Self::Error> {
        if let Some(key) = repr.attributes.keys().find(|k| !resolver::is_valid_key(k)) {
            return Err(invalid_name(key, "Not a valid key"));
        }

        let mut sections = IndexMap::with_capacity(repr.sections.len());
        for (name, mut child) in repr.sections {
            if !resolver::is_valid_section_name(&name) {
                return Err(invalid_name(&name, "Not a valid section name"));
            }
            child.name = name.clone();
            sections.insert(name, child);
        }

        Ok(Section::from_parts(String::new(), repr.attributes, sections, true))
    }
}

fn invalid_name(name: &str, message: &str) -> XclError {
    XclError::InvalidName {
        name: name.to_string(),
        message: message.into(),
        hint: None,
        code: Some(311),
    }
}

// Conversions are strict: a value only converts to the type its tag names.
// The path is filled in by the caller.

impl TryFrom<Value> for String {
    type Error = XclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(XclError::type_mismatch("", ValueKind::String, other.kind())),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = XclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(XclError::type_mismatch("", ValueKind::Int, other.kind())),
        }
    }
}

impl TryFrom<Value> for u64 {
    type Error = XclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::UInt(n) => Ok(n),
            other => Err(XclError::type_mismatch("", ValueKind::UInt, other.kind())),
        }
    }
}

impl TryFrom<Value> for f32 {
    type Error = XclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(n) => Ok(n),
            other => Err(XclError::type_mismatch("", ValueKind::Float, other.kind())),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = XclError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Double(n) => Ok(n),
            other => Err(XclError::type_mismatch("", ValueKind::Double, other.kind())),
        }
    }
}
