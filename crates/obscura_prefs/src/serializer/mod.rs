//! # Blob Serializers
//!
//! The whole store is persisted as one blob. Both formats are
//! self-describing (magic, version, format) so a blob written by one can be
//! recognized, and rejected, by the other.
//!
//! The serializer is picked once from [`SerializationSettings`] when the
//! store is built.

mod binary;
mod json;

pub use binary::BinarySerializer;
pub use json::JsonSerializer;

use crate::envelope::ObscuredPrefsData;
use crate::error::PrefsResult;
use crate::settings::{SerializationKind, SerializationSettings};
use std::collections::BTreeMap;

/// Magic bytes identifying a prefs blob.
pub const BLOB_MAGIC: &[u8; 4] = b"OBPR";

/// Current blob format version.
pub const BLOB_VERSION: u16 = 1;

/// Entries keyed by name, in name order.
pub type PrefsEntries = BTreeMap<String, ObscuredPrefsData>;

/// Converts the entry map to and from a blob.
pub trait StorageSerializer {
    /// Format written.
    fn kind(&self) -> SerializationKind;

    /// Serializes every entry.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Corrupt`](crate::PrefsError::Corrupt) if an
    /// entry cannot be encoded.
    fn serialize(&self, entries: &PrefsEntries) -> PrefsResult<Vec<u8>>;

    /// Parses a blob.
    ///
    /// # Errors
    ///
    /// Returns `Empty`, `Corrupt`, `VersionMismatch` or `FormatMismatch`;
    /// a damaged blob never yields an empty map.
    fn deserialize(&self, blob: &[u8]) -> PrefsResult<PrefsEntries>;
}

/// Closed set of serializers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefsSerializer {
    /// [`BinarySerializer`].
    Binary(BinarySerializer),
    /// [`JsonSerializer`].
    Json(JsonSerializer),
}

impl PrefsSerializer {
    /// Resolves the serializer for `settings`.
    #[must_use]
    pub const fn from_settings(settings: &SerializationSettings) -> Self {
        Self::for_kind(settings.kind)
    }

    /// Resolves the serializer for `kind`.
    #[must_use]
    pub const fn for_kind(kind: SerializationKind) -> Self {
        match kind {
            SerializationKind::Binary => Self::Binary(BinarySerializer),
            SerializationKind::Json => Self::Json(JsonSerializer),
        }
    }
}

impl StorageSerializer for PrefsSerializer {
    fn kind(&self) -> SerializationKind {
        match self {
            Self::Binary(s) => s.kind(),
            Self::Json(s) => s.kind(),
        }
    }

    fn serialize(&self, entries: &PrefsEntries) -> PrefsResult<Vec<u8>> {
        match self {
            Self::Binary(s) => s.serialize(entries),
            Self::Json(s) => s.serialize(entries),
        }
    }

    fn deserialize(&self, blob: &[u8]) -> PrefsResult<PrefsEntries> {
        match self {
            Self::Binary(s) => s.deserialize(blob),
            Self::Json(s) => s.deserialize(blob),
        }
    }
}

/// Guesses which serializer wrote `blob`.
#[must_use]
pub fn sniff_kind(blob: &[u8]) -> Option<SerializationKind> {
    if blob.starts_with(BLOB_MAGIC) {
        return Some(SerializationKind::Binary);
    }
    match blob.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Some(SerializationKind::Json),
        _ => None,
    }
}
