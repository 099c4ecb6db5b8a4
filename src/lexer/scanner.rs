use once_cell::sync::Lazy;
use regex::Regex;

use super::*;

// The key stops at the first whitespace or `=`, whichever comes first;
// everything up to the first `=` is then discarded.
static ATTRIBUTE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^\s=]*)[^=]*=(.*)$").expect("attribute pattern is valid")
});

/// Classify a raw line. Trailing whitespace (including `\r\n`) is ignored.
pub fn classify(raw: &str) -> Line {
    let line = raw.trim_end();

    if line.is_empty() {
        return Line::Blank;
    }

    if line.starts_with('[') {
        return if line.len() >= 2 && line.ends_with(']') {
            Line::Header(line[1..line.len() - 1].to_string())
        } else {
            Line::MalformedHeader(line.to_string())
        };
    }

    match ATTRIBUTE_LINE.captures(line) {
        Some(caps) => Line::Attribute {
            key: caps[1].to_string(),
            value: caps[2].trim().to_string(),
        },
        None => Line::Unrecognized(line.to_string()),
    }
}
