//! # Runtime Error Types

use obscura_detectors::DetectorError;
use obscura_prefs::PrefsError;
use thiserror::Error;

/// Errors surfaced by the runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObscuraError {
    /// Configuration file unreadable or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Detector construction failed.
    #[error(transparent)]
    Detector(#[from] DetectorError),

    /// Preference store failure.
    #[error(transparent)]
    Prefs(#[from] PrefsError),
}

/// Result type for runtime operations.
pub type ObscuraResult<T> = Result<T, ObscuraError>;
