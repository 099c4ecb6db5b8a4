use std::fmt;
use std::io::BufRead;

use crate::lexer::{Lexer, Line};
use crate::section::Section;
use crate::XclError;

mod document;
pub mod value;

pub use value::{decode, encode};

/// Why a line was skipped (or why parsing stopped early).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    InvalidValue,
    InvalidKey,
    DuplicateKey,
    MalformedHeader,
    /// A line that is not valid UTF-8.
    InvalidEncoding,
    /// A line with neither a header nor an `=`; parsing of the stream stops here.
    UnrecognizedLine,
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            DiagnosticKind::InvalidValue => "invalid value, line skipped",
            DiagnosticKind::InvalidKey => "invalid key, line skipped",
            DiagnosticKind::DuplicateKey => "duplicate key, first value kept",
            DiagnosticKind::MalformedHeader => "malformed section header, line skipped",
            DiagnosticKind::InvalidEncoding => "invalid UTF-8, line skipped",
            DiagnosticKind::UnrecognizedLine => "unrecognized line, parsing stopped",
        };
        write!(f, "line {}: {}: {}", self.line, what, self.text)
    }
}

/// Callback invoked for every [`Diagnostic`].
pub type DiagnosticHandler = dyn FnMut(&Diagnostic) + Send;

pub struct Parser<'h, R> {
    lexer: Lexer<R>,
    handler: Option<&'h mut DiagnosticHandler>,
}

impl<'h, R: BufRead> Parser<'h, R> {
    pub fn new(reader: R) -> Self {
        Self {
            lexer: Lexer::new(reader),
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: &'h mut DiagnosticHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub(crate) fn next_line(&mut self) -> Result<Option<Line>, XclError> {
        self.lexer.next_line()
    }

    pub(crate) fn report(&mut self, kind: DiagnosticKind, text: &str) {
        let diagnostic = Diagnostic {
            line: self.lexer.line(),
            kind,
            text: text.to_string(),
        };
        tracing::warn!(line = diagnostic.line, kind = ?kind, text, "xcl parse diagnostic");
        if let Some(handler) = self.handler.as_deref_mut() {
            handler(&diagnostic);
        }
    }

    /// Parse the whole stream into `root`, merging into sections that already exist.
    pub fn parse_into(&mut self, root: &mut Section) -> Result<(), XclError> {
        document::parse_document(self, root)
    }
}

/// Parse a complete document from a string.
pub fn parse_str(input: &str) -> Result<Section, XclError> {
    let mut root = Section::root();
    Parser::new(input.as_bytes()).parse_into(&mut root)?;
    Ok(root)
}
