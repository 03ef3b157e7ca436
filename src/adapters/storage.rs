use crate::utils::error::{CaptureError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// Owns the temp directory captures are spooled into.
#[derive(Debug, Clone)]
pub struct PayloadStore {
    dir: PathBuf,
}

impl PayloadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory and proves it is writable.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| self.storage_error(e))?;

        let check = Builder::new()
            .prefix(".writable_")
            .tempfile_in(&self.dir)
            .map_err(|e| self.storage_error(e))?;
        check.close().map_err(|e| self.storage_error(e))?;

        tracing::debug!("Temp storage ready at {}", self.dir.display());
        Ok(())
    }

    /// A fresh spool file, deleted when the handle is dropped.
    pub fn allocate(&self) -> Result<NamedTempFile> {
        Builder::new()
            .prefix("capture_")
            .suffix(".jpg")
            .tempfile_in(&self.dir)
            .map_err(|e| CaptureError::SpoolError {
                path: self.dir.display().to_string(),
                message: e.to_string(),
            })
    }

    fn storage_error(&self, e: std::io::Error) -> CaptureError {
        CaptureError::TempStorageError {
            path: self.dir.display().to_string(),
            message: e.to_string(),
        }
    }
}
