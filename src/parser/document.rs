use indexmap::map::Entry;

use super::*;
use crate::resolver;

/// Absorb root attributes, then descend into every header that follows.
pub(super) fn parse_document<R: BufRead>(
    parser: &mut Parser<R>,
    root: &mut Section,
) -> Result<(), XclError> {
    let mut pending = parse_attributes(parser, root)?;

    while let Some(header) = pending {
        pending = descend(parser, root, &header)?;
    }

    Ok(())
}

/// Read attribute lines into `section` until a header or the end of the block.
///
/// Returns the pending header path, or `None` when the stream is finished.
fn parse_attributes<R: BufRead>(
    parser: &mut Parser<R>,
    section: &mut Section,
) -> Result<Option<String>, XclError> {
    while let Some(line) = parser.next_line()? {
        match line {
            Line::Blank => {}
            Line::Header(path) => {
                if resolver::validate_section_path(&path).is_ok() {
                    return Ok(Some(path));
                }
                parser.report(DiagnosticKind::MalformedHeader, &format!("[{}]", path));
            }
            Line::MalformedHeader(raw) => {
                parser.report(DiagnosticKind::MalformedHeader, &raw);
            }
            Line::Attribute { key, value } => {
                parse_assignment(parser, section, key, &value);
            }
            Line::InvalidEncoding(raw) => {
                parser.report(DiagnosticKind::InvalidEncoding, &raw);
            }
            Line::Unrecognized(raw) => {
                parser.report(DiagnosticKind::UnrecognizedLine, &raw);
                return Ok(None);
            }
        }
    }

    Ok(None)
}

fn parse_assignment<R: BufRead>(
    parser: &mut Parser<R>,
    section: &mut Section,
    key: String,
    raw_value: &str,
) {
    if !resolver::is_valid_key(&key) {
        parser.report(DiagnosticKind::InvalidKey, &format!("{} = {}", key, raw_value));
        return;
    }

    let Some(value) = value::decode(raw_value) else {
        parser.report(DiagnosticKind::InvalidValue, &format!("{} = {}", key, raw_value));
        return;
    };

    match section.attributes_mut().entry(key) {
        Entry::Occupied(entry) => {
            let text = format!("{} = {}", entry.key(), raw_value);
            parser.report(DiagnosticKind::DuplicateKey, &text);
        }
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
    }
}

/// Walk `pending` one component at a time below `section`, reusing children
/// that already exist, and parse the attribute block into the last one.
fn descend<R: BufRead>(
    parser: &mut Parser<R>,
    section: &mut Section,
    pending: &str,
) -> Result<Option<String>, XclError> {
    let (head, rest) = resolver::split_first(pending);
    let child = section.child_or_insert(head);

    match rest {
        Some(rest) => descend(parser, child, rest),
        None => parse_attributes(parser, child),
    }
}
