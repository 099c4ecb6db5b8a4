// Author: Dustin Pilgrim
// License: MIT

use once_cell::sync::Lazy;
use regex::Regex;

use crate::XclError;

/// Structural separator between path components (`outer'inner'key`).
pub const DELIMITER: char = '\'';

static KEY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s='\[\]]+$").expect("key pattern is valid")
});

static SECTION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s'\[\]](?:[^'\[\]\r\n]*[^\s'\[\]])?$").expect("section pattern is valid")
});

/// Peel the first component off a path: `a'b'c` -> (`a`, Some(`b'c`)).
pub fn split_first(path: &str) -> (&str, Option<&str>) {
    match path.split_once(DELIMITER) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Split a path at its last delimiter: `a'b'c` -> (Some(`a'b`), `c`).
///
/// The left side addresses the containing section, the right side is the
/// attribute key inside it.
pub fn split_last(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once(DELIMITER) {
        Some((container, key)) => (Some(container), key),
        None => (None, path),
    }
}

pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, DELIMITER, name)
    }
}

pub fn is_valid_key(key: &str) -> bool {
    KEY_NAME.is_match(key)
}

pub fn is_valid_section_name(name: &str) -> bool {
    SECTION_NAME.is_match(name)
}

/// Check every component of a section path before anything gets created.
pub fn validate_section_path(path: &str) -> Result<(), XclError> {
    if path.is_empty() {
        return Err(XclError::InvalidPath {
            path: path.to_string(),
            message: "Section path is empty".into(),
            hint: None,
            code: Some(310),
        });
    }

    for component in path.split(DELIMITER) {
        if component.is_empty() {
            return Err(XclError::InvalidPath {
                path: path.to_string(),
                message: "Path contains an empty component".into(),
                hint: Some(format!("Separate sections with a single {}", DELIMITER)),
                code: Some(310),
            });
        }
        if !is_valid_section_name(component) {
            return Err(XclError::InvalidName {
                name: component.to_string(),
                message: "Not a valid section name".into(),
                hint: Some("Section names cannot contain brackets or line breaks, or start/end with whitespace".into()),
                code: Some(311),
            });
        }
    }

    Ok(())
}

/// Validate a `container'key` path and hand back its two halves.
pub fn validate_value_path(path: &str) -> Result<(Option<&str>, &str), XclError> {
    let (container, key) = split_last(path);
    if let Some(container) = container {
        validate_section_path(container)?;
    }
    if !is_valid_key(key) {
        return Err(XclError::InvalidName {
            name: key.to_string(),
            message: "Not a valid key".into(),
            hint: Some("Keys cannot be empty or contain whitespace, '=', brackets or the delimiter".into()),
            code: Some(311),
        });
    }
    Ok((container, key))
}
