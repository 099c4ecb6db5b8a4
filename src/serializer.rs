use std::fmt::{self, Write};
use std::fs;
use std::path::Path;

use crate::config::helpers;
use crate::parser::encode;
use crate::resolver;
use crate::section::Section;
use crate::XclError;

/// Write `section` and its subtree in canonical form.
///
/// Pre-order: header (omitted for the root), attributes in insertion order,
/// a blank separator, then each child. Dirty markers are not touched.
pub fn write_section<W: Write>(out: &mut W, section: &Section) -> fmt::Result {
    if !section.attributes().is_empty() {
        write_attributes(out, section)?;
        out.write_char('\n')?;
    }
    for (name, child) in section.sections() {
        write_subtree(out, child, name)?;
    }
    Ok(())
}

fn write_subtree<W: Write>(out: &mut W, section: &Section, full_path: &str) -> fmt::Result {
    writeln!(out, "[{}]", full_path)?;
    write_attributes(out, section)?;
    out.write_char('\n')?;

    for (name, child) in section.sections() {
        write_subtree(out, child, &resolver::join(full_path, name))?;
    }
    Ok(())
}

fn write_attributes<W: Write>(out: &mut W, section: &Section) -> fmt::Result {
    for (key, value) in section.attributes() {
        writeln!(out, "{} = {}", key, encode(value))?;
    }
    Ok(())
}

/// Canonical text, as written by a save.
impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_section(f, self)
    }
}

impl Section {
    /// Serialize this section to an arbitrary file as a standalone document.
    ///
    /// The section becomes the root of the written file. Missing parent
    /// directories are created. Dirty markers are left alone: only a
    /// document's own save counts as a full write.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), XclError> {
        let path = path.as_ref();
        if !helpers::is_writable_target(path) {
            return Err(XclError::FileError {
                message: "Target exists and is not a regular file".into(),
                path: path.display().to_string(),
                hint: Some("Choose a file path, not a directory".into()),
                code: Some(302),
            });
        }
        helpers::create_parent_dirs(path)?;
        fs::write(path, self.to_string()).map_err(|e| helpers::write_error(path, e))
    }
}
