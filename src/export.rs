// Author: Dustin Pilgrim
// License: MIT

use std::fmt::Write;

use crate::section::Section;
use crate::XclError;

/// Render a section tree for humans: one indented block per section, with
/// each value's type spelled out.
///
/// Unlike the canonical form this is not meant to be parsed back.
///
/// # Examples
/// ```
/// use xcl::{export, Section};
///
/// let config: Section = "[a'b]\nx = i'42\n".parse().unwrap();
/// assert_eq!(export::dump(&config), "[a]\n  [b]\n    x = 42 (signed integer)\n");
/// ```
pub fn dump(section: &Section) -> String {
    let mut out = String::new();
    if section.name().is_empty() {
        dump_body(&mut out, section, 0);
    } else {
        dump_section(&mut out, section.name(), section, 0);
    }
    out
}

fn dump_section(out: &mut String, name: &str, section: &Section, depth: usize) {
    let _ = writeln!(out, "{}[{}]", "  ".repeat(depth), name);
    dump_body(out, section, depth + 1);
}

fn dump_body(out: &mut String, section: &Section, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, value) in section.attributes() {
        let _ = writeln!(out, "{}{} = {} ({})", indent, key, value, value.kind());
    }
    for (name, child) in section.sections() {
        dump_section(out, name, child, depth);
    }
}

/// Export a section tree to pretty JSON.
///
/// Sections become `{"attributes", "sections"}` objects keyed by name and
/// values keep their tag: `{"int": 42}`, `{"string": "hi"}`.
pub fn to_json(section: &Section) -> Result<String, XclError> {
    serde_json::to_string_pretty(section).map_err(|e| XclError::JsonError {
        message: format!("Failed to export: {}", e),
        hint: None,
        code: Some(501),
    })
}

/// Rebuild a section tree from [`to_json`] output. Every section starts dirty.
///
/// Keys and section names must be expressible in the text format; anything
/// else is a [`XclError::JsonError`].
pub fn from_json(input: &str) -> Result<Section, XclError> {
    serde_json::from_str(input).map_err(|e| XclError::JsonError {
        message: format!("Failed to import: {}", e),
        hint: Some("Expected the shape produced by export::to_json".into()),
        code: Some(501),
    })
}
