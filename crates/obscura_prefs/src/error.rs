//! # Prefs Error Types
//!
//! All errors that can occur while storing and persisting preferences.

use crate::envelope::StorageDataType;
use crate::settings::SerializationKind;
use thiserror::Error;

/// Errors that can occur in the preference store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefsError {
    /// No blob has been saved yet.
    #[error("no saved preferences")]
    Missing,

    /// The saved blob has zero length.
    #[error("saved preferences are empty")]
    Empty,

    /// The blob is damaged or truncated.
    #[error("corrupted preferences: {reason}")]
    Corrupt {
        /// What failed to parse.
        reason: String,
    },

    /// The blob was written by an unsupported format version.
    #[error("unsupported preferences version {found} (expected {expected})")]
    VersionMismatch {
        /// Version this build writes.
        expected: u16,
        /// Version found in the blob.
        found: u16,
    },

    /// The blob was written by the other serializer.
    #[error("preferences were saved as {found:?}, store reads {expected:?}")]
    FormatMismatch {
        /// Format this store reads.
        expected: SerializationKind,
        /// Format found in the blob.
        found: SerializationKind,
    },

    /// Entry holds another type.
    #[error("entry '{key}' holds {found:?}, requested {expected:?}")]
    TypeMismatch {
        /// Entry name.
        key: String,
        /// Requested type.
        expected: StorageDataType,
        /// Stored type.
        found: StorageDataType,
    },

    /// Entry decrypted to bytes that fail its checksum (wrong key or edited).
    #[error("integrity check failed for entry '{key}'")]
    IntegrityViolation {
        /// Entry name.
        key: String,
    },

    /// Entry exceeds what a blob can hold.
    #[error("{what} too large: {len} bytes (max {max})")]
    TooLarge {
        /// Field that overflowed.
        what: &'static str,
        /// Actual length.
        len: usize,
        /// Largest accepted length.
        max: usize,
    },

    /// Invalid settings.
    #[error("invalid prefs configuration: {0}")]
    InvalidConfig(String),

    /// Backend I/O failure.
    #[error("prefs I/O failed: {0}")]
    Io(String),
}

impl PrefsError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::Corrupt {
            reason: reason.into(),
        }
    }

    /// Returns true if the saved data exists but cannot be trusted.
    #[must_use]
    pub const fn is_corrupt(&self) -> bool {
        matches!(
            self,
            Self::Corrupt { .. }
                | Self::VersionMismatch { .. }
                | Self::FormatMismatch { .. }
                | Self::IntegrityViolation { .. }
        )
    }

    /// Returns true if nothing usable was ever saved.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing | Self::Empty)
    }
}

/// Rejects `len` above `max`.
pub(crate) fn check_len(what: &'static str, len: usize, max: usize) -> PrefsResult<()> {
    if len > max {
        return Err(PrefsError::TooLarge { what, len, max });
    }
    Ok(())
}

/// Result type for prefs operations.
pub type PrefsResult<T> = Result<T, PrefsError>;
