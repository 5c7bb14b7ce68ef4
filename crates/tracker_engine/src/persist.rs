use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("parent directory missing or not writable: {0}")]
    ParentDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory that will hold `file` exists; create if missing.
pub fn ensure_parent_dir(file: &Path) -> Result<PathBuf, PersistError> {
    let dir = match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.exists() {
        let meta = fs::metadata(&dir).map_err(|e| PersistError::ParentDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ParentDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(&dir).map_err(|e| PersistError::ParentDir(e.to_string()))?;
    }
    Ok(dir)
}

/// Replaces a file's whole content by writing a sibling temp file then renaming,
/// so readers never observe a half-written ledger or mailbox.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    pub fn path(&self) -> &Path {
        &self.target
    }

    pub fn write(&self, content: &[u8]) -> Result<(), PersistError> {
        let dir = ensure_parent_dir(&self.target)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        tmp.persist(&self.target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }
}
