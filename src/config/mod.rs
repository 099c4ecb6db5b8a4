// Author: Dustin Pilgrim
// License: MIT

use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::parser::{Diagnostic, DiagnosticHandler, Parser};
use crate::section::Section;
use crate::XclError;

pub(crate) mod helpers;

/// A root [`Section`] bound to a backing file.
///
/// The document dereferences to its root section, so every tree operation is
/// available directly. On top of that it adds the file lifecycle:
///
/// - [`Xcl::open`] resolves the path and parses the file if it exists
/// - [`Xcl::save`] rewrites the whole file, but only when something changed
/// - [`Xcl::reload`] reparses from scratch when the file's mtime moved
pub struct Xcl {
    root: Section,
    path: Option<PathBuf>,
    last_write_time: Option<SystemTime>,
    on_diagnostic: Option<Box<DiagnosticHandler>>,
}

impl Xcl {
    /// Open a document, never failing.
    ///
    /// If the path cannot be resolved or the file cannot be read, the result
    /// is an empty document with no recorded mtime and the failure is only
    /// logged. Prefer [`Xcl::open`] when the caller wants to know.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let resolved = match helpers::resolve_path(path) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "xcl path not resolvable, starting empty");
                return Self::empty(None);
            }
        };

        let mut doc = Self::empty(Some(resolved));
        if let Err(e) = doc.load() {
            tracing::warn!(path = %path.display(), error = %e, "xcl load failed, starting empty");
            doc.root = Section::root();
            doc.last_write_time = None;
        }
        doc
    }

    /// Resolve `path` to absolute form and load it if it names a file or symlink.
    ///
    /// A missing file is not an error: the document starts empty and the file
    /// is created by the first save.
    ///
    /// # Example
    /// ```no_run
    /// # use xcl::Xcl;
    /// let mut config = Xcl::open("~/.config/app/settings.xcl")?;
    /// config.insert_or_assign("window'width", 1280u64)?;
    /// config.save(false)?;
    /// # Ok::<(), xcl::XclError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, XclError> {
        let resolved = helpers::resolve_path(path.as_ref())?;
        let mut doc = Self::empty(Some(resolved));
        doc.load()?;
        Ok(doc)
    }

    /// Like [`Xcl::open`], reporting skipped lines to `handler`.
    ///
    /// The handler is kept and used again by [`Xcl::reload`].
    pub fn open_with<P, F>(path: P, handler: F) -> Result<Self, XclError>
    where
        P: AsRef<Path>,
        F: FnMut(&Diagnostic) + Send + 'static,
    {
        let resolved = helpers::resolve_path(path.as_ref())?;
        let mut doc = Self::empty(Some(resolved));
        doc.on_diagnostic = Some(Box::new(handler));
        doc.load()?;
        Ok(doc)
    }

    fn empty(path: Option<PathBuf>) -> Self {
        Xcl {
            root: Section::root(),
            path,
            last_write_time: None,
            on_diagnostic: None,
        }
    }

    pub fn set_diagnostic_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&Diagnostic) + Send + 'static,
    {
        self.on_diagnostic = Some(Box::new(handler));
    }

    /// The resolved absolute backing path, if resolution succeeded.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The file's mtime as of the last load or save.
    pub fn last_write_time(&self) -> Option<SystemTime> {
        self.last_write_time
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Section {
        &mut self.root
    }

    pub fn into_root(self) -> Section {
        self.root
    }

    /// Replace the tree with a fresh parse of the backing file.
    fn load(&mut self) -> Result<(), XclError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let mut root = Section::root();
        let mtime = load_file(path, &mut root, self.on_diagnostic.as_deref_mut())?;
        self.root = root;
        self.last_write_time = mtime;
        Ok(())
    }

    /// Write the whole tree to the backing file.
    ///
    /// Nothing happens unless `force` is set or some section reports
    /// [`Section::needs_write`]. A target that exists but is not a file or
    /// symlink is skipped silently. Returns whether the file was written;
    /// only a completed write clears the dirty markers.
    pub fn save(&mut self, force: bool) -> Result<bool, XclError> {
        if !force && !self.root.needs_write() {
            tracing::debug!("xcl document clean, save skipped");
            return Ok(false);
        }

        let Some(path) = self.path.as_deref() else {
            tracing::warn!("xcl document has no resolved path, save skipped");
            return Ok(false);
        };

        if !helpers::is_writable_target(path) {
            tracing::debug!(path = %path.display(), "xcl target is not a file, save skipped");
            return Ok(false);
        }

        helpers::create_parent_dirs(path)?;
        fs::write(path, self.root.to_string())
            .map_err(|e| helpers::write_error(path, e))?;

        self.root.mark_clean();
        self.last_write_time = helpers::modified_time(path);
        tracing::debug!(path = %path.display(), "xcl document saved");
        Ok(true)
    }

    /// Reparse the backing file if its mtime changed since the last load or save.
    ///
    /// This is a full replace: unsaved edits are discarded. A file that has
    /// disappeared counts as a change and leaves the document empty. Returns
    /// whether a reparse happened.
    pub fn reload(&mut self, force: bool) -> Result<bool, XclError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };

        let current = loadable_mtime(path);
        if !force && current == self.last_write_time {
            tracing::debug!(path = %path.display(), "xcl file unchanged, reload skipped");
            return Ok(false);
        }

        tracing::debug!(path = %path.display(), force, "xcl file reloading");
        self.load()?;
        Ok(true)
    }
}

fn loadable_mtime(path: &Path) -> Option<SystemTime> {
    if helpers::is_loadable(path) {
        helpers::modified_time(path)
    } else {
        None
    }
}

/// Parse `path` into `root` if it is a file or symlink; returns its mtime.
fn load_file(
    path: &Path,
    root: &mut Section,
    handler: Option<&mut DiagnosticHandler>,
) -> Result<Option<SystemTime>, XclError> {
    if !helpers::is_loadable(path) {
        return Ok(None);
    }

    let mtime = helpers::modified_time(path);
    let file = File::open(path).map_err(|e| helpers::read_error(path, e))?;

    let mut parser = Parser::new(BufReader::new(file));
    if let Some(handler) = handler {
        parser = parser.with_handler(handler);
    }
    parser.parse_into(root)?;

    tracing::debug!(path = %path.display(), "xcl file loaded");
    Ok(mtime)
}

impl Deref for Xcl {
    type Target = Section;

    fn deref(&self) -> &Section {
        &self.root
    }
}

impl DerefMut for Xcl {
    fn deref_mut(&mut self) -> &mut Section {
        &mut self.root
    }
}

impl fmt::Debug for Xcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xcl")
            .field("path", &self.path)
            .field("last_write_time", &self.last_write_time)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
