//! # Prefs Settings
//!
//! ```toml
//! file = "saves/prefs.obpr"
//!
//! [serialization]
//! kind = "json"
//! ```

use crate::error::{PrefsError, PrefsResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Blob format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationKind {
    /// Compact little-endian binary.
    #[default]
    Binary,
    /// Human-readable JSON.
    Json,
}

impl SerializationKind {
    /// Format byte written into blobs.
    #[must_use]
    pub const fn format_byte(self) -> u8 {
        match self {
            Self::Binary => 1,
            Self::Json => 2,
        }
    }

    /// Parses a format byte.
    #[must_use]
    pub const fn from_format_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Binary),
            2 => Some(Self::Json),
            _ => None,
        }
    }
}

/// Serializer selection. Fixed for the lifetime of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializationSettings {
    /// Blob format.
    pub kind: SerializationKind,
}

/// Store settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefsSettings {
    /// Blob location for the file backend.
    pub file: PathBuf,
    /// Serializer selection.
    pub serialization: SerializationSettings,
}

impl Default for PrefsSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("obscura_prefs.obpr"),
            serialization: SerializationSettings::default(),
        }
    }
}

impl PrefsSettings {
    /// Parses settings from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::InvalidConfig`] for malformed TOML or an empty
    /// file path.
    pub fn from_toml_str(text: &str) -> PrefsResult<Self> {
        let settings: Self = toml::from_str(text).map_err(|e| PrefsError::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::InvalidConfig`] for an empty file path.
    pub fn validate(&self) -> PrefsResult<()> {
        if self.file.as_os_str().is_empty() {
            return Err(PrefsError::InvalidConfig("prefs file path is empty".to_string()));
        }
        Ok(())
    }
}
