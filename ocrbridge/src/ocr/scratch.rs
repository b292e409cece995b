use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::absolute;
use crate::error::{OcrBridgeError, Result};

/// A uniquely named directory owned by a single extraction.
///
/// The directory and everything in it is removed when the session is dropped,
/// whichever way the owning call exits. Removal failures are logged, never returned.
#[derive(Debug)]
pub struct ScratchSession {
    path: PathBuf,
}

impl ScratchSession {
    /// Create `<root>/<uuid>`, creating `root` as well if it is missing.
    ///
    /// The session path is always absolute: the engine runs from its own
    /// working directory and must be able to resolve every staged file.
    pub fn create(root: &Path) -> Result<Self> {
        let root = absolute(root).map_err(|source| OcrBridgeError::ScratchCreation {
            path: root.to_path_buf(),
            source,
        })?;
        let path = root.join(Uuid::new_v4().to_string());

        fs::create_dir_all(&path).map_err(|source| OcrBridgeError::ScratchCreation {
            path: path.clone(),
            source,
        })?;

        debug!(scratch = %path.display(), "Created scratch directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh, extension-less file name inside the session. Nothing is created on disk.
    pub fn new_file_path(&self) -> PathBuf {
        self.path.join(Uuid::new_v4().to_string())
    }

    /// Create (or truncate) `path` for writing.
    pub fn create_file(&self, path: &Path) -> Result<File> {
        File::create(path).map_err(|source| OcrBridgeError::ScratchCreation {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write `bytes` to `path`, reporting failures as scratch errors.
    pub fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).map_err(|source| OcrBridgeError::ScratchCreation {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Drop for ScratchSession {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(scratch = %self.path.display(), "Removed scratch directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                scratch = %self.path.display(),
                error = %e,
                "Failed to remove scratch directory"
            ),
        }
    }
}
