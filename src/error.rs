use thiserror::Error;

use crate::ast::ValueKind;

/// The main error type for XCL documents, paths and typed access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XclError {
    #[error("[XCL] Invalid path '{path}': {message}{}", suffix(.hint, .code))]
    InvalidPath {
        path: String,
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a key or section name breaks the naming rules.
    #[error("[XCL] Invalid name '{name}': {message}{}", suffix(.hint, .code))]
    InvalidName {
        name: String,
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[XCL] Path '{path}' not found{}", suffix(.hint, .code))]
    NotFound {
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when a stored value carries a different tag than the one requested.
    #[error("[XCL] Type Error at '{path}': expected {expected}, found {found}{}", suffix(.hint, .code))]
    TypeMismatch {
        path: String,
        expected: ValueKind,
        found: ValueKind,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[XCL] File Error '{path}': {message}{}", suffix(.hint, .code))]
    FileError {
        message: String,
        path: String,
        hint: Option<String>,
        code: Option<u32>,
    },
    /// Raised when the input stream itself fails mid-parse.
    #[error("[XCL] Stream Error at line {line}: {message}{}", suffix(.hint, .code))]
    StreamError {
        message: String,
        line: usize,
        hint: Option<String>,
        code: Option<u32>,
    },
    #[error("[XCL] JSON Error: {message}{}", suffix(.hint, .code))]
    JsonError {
        message: String,
        hint: Option<String>,
        code: Option<u32>,
    },
}

fn suffix(hint: &Option<String>, code: &Option<u32>) -> String {
    format!(
        "{}{}",
        hint.as_ref().map_or(String::new(), |h| format!(" Hint: {}", h)),
        code.map_or(String::new(), |c| format!(" Code: {}", c))
    )
}

impl XclError {
    /// Numeric code attached to the error, if any.
    pub fn code(&self) -> Option<u32> {
        match self {
            XclError::InvalidPath { code, .. }
            | XclError::InvalidName { code, .. }
            | XclError::NotFound { code, .. }
            | XclError::TypeMismatch { code, .. }
            | XclError::FileError { code, .. }
            | XclError::StreamError { code, .. }
            | XclError::JsonError { code, .. } => *code,
        }
    }

    /// Fill in the path of a conversion error raised before the path was known.
    pub(crate) fn at_path(self, at: &str) -> Self {
        match self {
            XclError::TypeMismatch { path, expected, found, hint, code } if path.is_empty() => {
                XclError::TypeMismatch { path: at.to_string(), expected, found, hint, code }
            }
            other => other,
        }
    }

    pub(crate) fn not_found(path: &str) -> Self {
        XclError::NotFound {
            path: path.to_string(),
            hint: Some("Check that the path exists in your config file".into()),
            code: Some(304),
        }
    }

    pub(crate) fn type_mismatch(path: &str, expected: ValueKind, found: ValueKind) -> Self {
        XclError::TypeMismatch {
            path: path.to_string(),
            expected,
            found,
            hint: Some(format!(
                "The value is stored with tag '{}'; read it as {}",
                found.tag(),
                found
            )),
            code: Some(401),
        }
    }
}
