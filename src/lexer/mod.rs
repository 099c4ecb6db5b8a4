// Author: Dustin Pilgrim
// License: MIT

use std::io::BufRead;

use crate::XclError;

mod scanner;

pub use scanner::classify;

/// One physical line of an XCL stream, classified but not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    // --- layout ---
    Blank,

    // --- structure ---
    /// `[a'b]` with the brackets stripped.
    Header(String),
    /// Starts with `[` but has no closing bracket or is too short.
    MalformedHeader(String),

    // --- content ---
    /// `key = rest`; `value` is the trimmed right-hand side.
    Attribute { key: String, value: String },
    /// Anything else: no `=` anywhere on the line.
    Unrecognized(String),

    // --- encoding ---
    /// Bytes that are not UTF-8, lossily decoded for reporting.
    InvalidEncoding(String),
}

pub struct Lexer<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Lexer {
            reader,
            buf: Vec::new(),
            line: 0,
        }
    }

    /// 1-based number of the line most recently returned.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read and classify the next line, `None` at end of stream.
    ///
    /// Only I/O failures are errors. A line that is not UTF-8 comes back as
    /// [`Line::InvalidEncoding`] so the caller can skip it.
    pub fn next_line(&mut self) -> Result<Option<Line>, XclError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| XclError::StreamError {
                message: format!("Failed to read line: {}", e),
                line: self.line + 1,
                hint: None,
                code: Some(201),
            })?;

        if read == 0 {
            return Ok(None);
        }

        self.line += 1;
        match std::str::from_utf8(&self.buf) {
            Ok(text) => Ok(Some(classify(text))),
            Err(_) => {
                let lossy = String::from_utf8_lossy(&self.buf);
                Ok(Some(Line::InvalidEncoding(lossy.trim_end().to_string())))
            }
        }
    }
}
