//! Filesystem primitives behind the browser: listing, creation, deletion,
//! rename and copy. Everything returns [`FsError`] so callers can decide
//! whether a failure is fatal or just a footer message.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from filesystem primitives.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Wrap an I/O error with path context, classifying the common kinds.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// One filesystem entry shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// List `path`, directories first, then case-sensitive by name.
pub fn list_dir(path: &Path) -> Result<Vec<Item>, FsError> {
    let entries = fs::read_dir(path)
        .map_err(|e| FsError::io(path, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| FsError::io(path, e))?;

    let mut items: Vec<Item> = entries
        .into_iter()
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            Item {
                path: path.join(&name),
                name,
                is_dir,
            }
        })
        .collect();

    items.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(items)
}

pub fn create_dir(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
}

/// Create an empty file; an existing file is left untouched.
pub fn create_file(path: &Path) -> Result<(), FsError> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| FsError::io(path, e))
}

/// Remove a file, or a directory with everything under it.
pub fn delete(path: &Path) -> Result<(), FsError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| FsError::io(path, e))
}

pub fn rename(old: &Path, new: &Path) -> Result<(), FsError> {
    fs::rename(old, new).map_err(|e| FsError::io(old, e))
}

/// Copy a file, or a directory recursively.
pub fn copy_any(src: &Path, dst: &Path) -> Result<(), FsError> {
    if src.is_dir() {
        copy_dir_recursively(src, dst).map_err(|e| FsError::io(src, e))
    } else {
        fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| FsError::io(src, e))
    }
}

fn copy_dir_recursively(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if path.is_dir() {
            copy_dir_recursively(&path, &dst_path)?;
        } else {
            fs::copy(&path, &dst_path)?;
        }
    }
    Ok(())
}
