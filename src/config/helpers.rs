use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::XclError;

/// Expand a leading `~/` and make the path absolute against the current directory.
pub(crate) fn resolve_path(raw_path: &Path) -> Result<PathBuf, XclError> {
    let display = raw_path.display().to_string();

    if raw_path.as_os_str().is_empty() {
        return Err(XclError::FileError {
            message: "Path is empty".into(),
            path: display,
            hint: Some("Pass the location of the .xcl file".into()),
            code: Some(303),
        });
    }

    let expanded = match raw_path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().ok_or_else(|| XclError::FileError {
                message: "Could not determine home directory for ~ expansion".into(),
                path: display.clone(),
                hint: Some("Set HOME or use an absolute path".into()),
                code: Some(303),
            })?;
            home.join(rest)
        }
        Err(_) => raw_path.to_path_buf(),
    };

    std::path::absolute(&expanded).map_err(|e| XclError::FileError {
        message: format!("Failed to resolve absolute path: {}", e),
        path: display,
        hint: None,
        code: Some(303),
    })
}

/// Regular files and symlinks are loaded; anything else at the path is ignored.
pub(crate) fn is_loadable(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_file() || meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// False only when something other than a file or symlink already sits at
/// `path`. Lookup failures are left for the write itself to report.
pub(crate) fn is_writable_target(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(meta) => meta.file_type().is_file() || meta.file_type().is_symlink(),
        Err(_) => true,
    }
}

pub(crate) fn create_parent_dirs(path: &Path) -> Result<(), XclError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| XclError::FileError {
                message: format!("Failed to create parent directories: {}", e),
                path: parent.display().to_string(),
                hint: Some("Check permissions on the containing directory".into()),
                code: Some(302),
            })
        }
        _ => Ok(()),
    }
}

pub(crate) fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

pub(crate) fn read_error(path: &Path, e: io::Error) -> XclError {
    XclError::FileError {
        message: format!("Failed to read file: {}", e),
        path: path.display().to_string(),
        hint: Some("Check that the file exists and is readable".into()),
        code: Some(301),
    }
}

pub(crate) fn write_error(path: &Path, e: io::Error) -> XclError {
    XclError::FileError {
        message: format!("Failed to write file: {}", e),
        path: path.display().to_string(),
        hint: Some("Check that the location is writable".into()),
        code: Some(302),
    }
}
