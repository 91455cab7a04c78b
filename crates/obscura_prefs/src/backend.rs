//! # Storage Backends
//!
//! Where the blob lives. The store never interprets backend errors beyond
//! "nothing saved yet" versus "I/O failed".

use crate::error::{PrefsError, PrefsResult};
use parking_lot::Mutex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Blob persistence.
pub trait PrefsBackend: Send + Sync {
    /// Reads the saved blob.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Missing`] if nothing was saved, or
    /// [`PrefsError::Io`] on failure.
    fn read(&self) -> PrefsResult<Vec<u8>>;

    /// Replaces the saved blob.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Io`] on failure.
    fn write(&self, blob: &[u8]) -> PrefsResult<()>;

    /// Removes the saved blob. Removing nothing is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Io`] on failure.
    fn clear(&self) -> PrefsResult<()>;
}

/// Blob in a file, replaced atomically through a temp file.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Creates a backend for `path`. Nothing is touched until the first
    /// read or write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Blob location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, action: &str, e: &std::io::Error) -> PrefsError {
        PrefsError::Io(format!("{action} {}: {e}", self.path.display()))
    }
}

impl PrefsBackend for FileBackend {
    fn read(&self) -> PrefsResult<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(blob) => Ok(blob),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PrefsError::Missing),
            Err(e) => Err(self.io_error("failed to read", &e)),
        }
    }

    fn write(&self, blob: &[u8]) -> PrefsResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("failed to create directory for", &e))?;
        }

        let temp = self.temp_path();
        {
            let mut file = fs::File::create(&temp).map_err(|e| self.io_error("failed to create temp for", &e))?;
            file.write_all(blob)
                .map_err(|e| self.io_error("failed to write", &e))?;
            file.sync_all()
                .map_err(|e| self.io_error("failed to sync", &e))?;
        }
        fs::rename(&temp, &self.path).map_err(|e| self.io_error("failed to replace", &e))
    }

    fn clear(&self) -> PrefsResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("failed to remove", &e)),
        }
    }
}

/// Blob in memory. Clones share the buffer.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the saved blob, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.blob.lock().clone()
    }

    /// Replaces the saved blob directly.
    pub fn set_blob(&self, blob: Vec<u8>) {
        *self.blob.lock() = Some(blob);
    }
}

impl PrefsBackend for MemoryBackend {
    fn read(&self) -> PrefsResult<Vec<u8>> {
        self.blob.lock().clone().ok_or(PrefsError::Missing)
    }

    fn write(&self, blob: &[u8]) -> PrefsResult<()> {
        *self.blob.lock() = Some(blob.to_vec());
        Ok(())
    }

    fn clear(&self) -> PrefsResult<()> {
        *self.blob.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs_path(tag: &str) -> PathBuf {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("obscura_backend_{tag}_{id}")).join("prefs.obpr")
    }

    #[test]
    fn test_file_backend_lifecycle() {
        let path = temp_prefs_path("lifecycle");
        let backend = FileBackend::new(&path);

        assert_eq!(backend.read(), Err(PrefsError::Missing));
        backend.write(b"first").unwrap();
        backend.write(b"second").unwrap();
        assert_eq!(backend.read().unwrap(), b"second");
        assert!(!backend.temp_path().exists());

        backend.clear().unwrap();
        backend.clear().unwrap();
        assert_eq!(backend.read(), Err(PrefsError::Missing));

        if let Some(dir) = path.parent() {
            fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_memory_backend_shares_buffer() {
        let backend = MemoryBackend::new();
        let view = backend.clone();
        assert_eq!(backend.read(), Err(PrefsError::Missing));
        backend.write(&[1, 2, 3]).unwrap();
        assert_eq!(view.snapshot(), Some(vec![1, 2, 3]));
        view.clear().unwrap();
        assert!(backend.snapshot().is_none());
    }
}
