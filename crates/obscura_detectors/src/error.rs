//! # Detector Error Types

use thiserror::Error;

/// A platform API the detectors depend on could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The API is missing or returned an error.
    #[error("platform API unavailable: {api}: {reason}")]
    Unavailable {
        /// API that failed.
        api: &'static str,
        /// Failure description.
        reason: String,
    },
}

impl PlatformError {
    /// Builds an [`PlatformError::Unavailable`].
    #[must_use]
    pub fn unavailable(api: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            api,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building detectors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectorError {
    /// Configuration rejected at construction.
    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    /// Settings file could not be parsed.
    #[error("invalid detector settings: {0}")]
    Settings(String),

    /// Platform API failure surfaced at construction.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result type for detector construction.
pub type DetectorResult<T> = Result<T, DetectorError>;
