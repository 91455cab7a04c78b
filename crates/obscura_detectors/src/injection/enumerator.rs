//! # Library Enumeration
//!
//! Platform-specific listing of the libraries mapped into the process.

use crate::error::PlatformError;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Lists libraries loaded into the current process.
pub trait LibraryEnumerator: Send {
    /// Returns loaded library paths or names.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform cannot be queried.
    fn loaded_libraries(&self) -> Result<Vec<String>, PlatformError>;
}

/// Reads shared objects from a Linux `maps` file.
#[derive(Clone, Debug)]
pub struct ProcMapsEnumerator {
    path: PathBuf,
}

impl ProcMapsEnumerator {
    /// Maps file of the current process.
    pub const SELF_MAPS: &'static str = "/proc/self/maps";

    /// Enumerator over an explicit maps file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcMapsEnumerator {
    fn default() -> Self {
        Self::with_path(Self::SELF_MAPS)
    }
}

impl LibraryEnumerator for ProcMapsEnumerator {
    fn loaded_libraries(&self) -> Result<Vec<String>, PlatformError> {
        let maps = std::fs::read_to_string(&self.path).map_err(|e| {
            PlatformError::unavailable("proc maps", format!("{}: {e}", self.path.display()))
        })?;
        Ok(parse_maps(&maps))
    }
}

/// Extracts unique shared-object paths from `maps` content.
///
/// Line format: `address perms offset dev inode pathname`.
fn parse_maps(maps: &str) -> Vec<String> {
    let libraries: BTreeSet<&str> = maps
        .lines()
        .filter_map(|line| line.split_whitespace().nth(5))
        .filter(|path| path.starts_with('/') && path.contains(".so"))
        .collect();
    libraries.into_iter().map(str::to_string).collect()
}

/// Enumerator over a list the host supplies.
///
/// For platforms where the host engine already knows its loaded modules.
/// Clones share the list.
#[derive(Clone, Debug, Default)]
pub struct StaticEnumerator {
    libraries: Arc<Mutex<Vec<String>>>,
}

impl StaticEnumerator {
    /// Creates an enumerator over `libraries`.
    pub fn new<I, S>(libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            libraries: Arc::new(Mutex::new(libraries.into_iter().map(Into::into).collect())),
        }
    }

    /// Records a newly loaded library.
    pub fn push(&self, library: impl Into<String>) {
        self.libraries.lock().push(library.into());
    }
}

impl LibraryEnumerator for StaticEnumerator {
    fn loaded_libraries(&self) -> Result<Vec<String>, PlatformError> {
        Ok(self.libraries.lock().clone())
    }
}
