//! # Json Blob
//!
//! ```json
//! {
//!   "magic": "OBPR",
//!   "version": 1,
//!   "format": "json",
//!   "entries": {
//!     "volume": { "data_type": "float", "salt": 1, "checksum": 2, "payload": [1, 2, 3, 4] }
//!   }
//! }
//! ```
//!
//! The header is checked before the entries are decoded, so a version or
//! format mismatch is reported as such and not as a shape error.

use super::{sniff_kind, PrefsEntries, StorageSerializer, BLOB_MAGIC, BLOB_VERSION};
use crate::error::{PrefsError, PrefsResult};
use crate::settings::SerializationKind;
use serde::{Deserialize, Serialize};

/// Human-readable serializer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonSerializer;

#[derive(Serialize)]
struct JsonBlobOut<'a> {
    magic: &'a str,
    version: u16,
    format: SerializationKind,
    entries: &'a PrefsEntries,
}

#[derive(Deserialize)]
struct JsonBlobIn {
    magic: String,
    version: u16,
    format: SerializationKind,
    entries: serde_json::Value,
}

fn magic_str() -> &'static str {
    std::str::from_utf8(BLOB_MAGIC).unwrap_or("OBPR")
}

impl StorageSerializer for JsonSerializer {
    fn kind(&self) -> SerializationKind {
        SerializationKind::Json
    }

    fn serialize(&self, entries: &PrefsEntries) -> PrefsResult<Vec<u8>> {
        let blob = JsonBlobOut {
            magic: magic_str(),
            version: BLOB_VERSION,
            format: SerializationKind::Json,
            entries,
        };
        serde_json::to_vec_pretty(&blob).map_err(|e| PrefsError::corrupt(format!("json encode failed: {e}")))
    }

    fn deserialize(&self, blob: &[u8]) -> PrefsResult<PrefsEntries> {
        if blob.is_empty() {
            return Err(PrefsError::Empty);
        }
        if sniff_kind(blob) == Some(SerializationKind::Binary) {
            return Err(PrefsError::FormatMismatch {
                expected: SerializationKind::Json,
                found: SerializationKind::Binary,
            });
        }

        let header: JsonBlobIn =
            serde_json::from_slice(blob).map_err(|e| PrefsError::corrupt(format!("invalid json blob: {e}")))?;
        if header.magic != magic_str() {
            return Err(PrefsError::corrupt(format!("invalid blob magic '{}'", header.magic)));
        }
        if header.version != BLOB_VERSION {
            return Err(PrefsError::VersionMismatch {
                expected: BLOB_VERSION,
                found: header.version,
            });
        }
        if header.format != SerializationKind::Json {
            return Err(PrefsError::FormatMismatch {
                expected: SerializationKind::Json,
                found: header.format,
            });
        }

        serde_json::from_value(header.entries).map_err(|e| PrefsError::corrupt(format!("invalid entries: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_is_readable_json() {
        let blob = JsonSerializer.serialize(&PrefsEntries::new()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
        assert_eq!(value["magic"], "OBPR");
        assert_eq!(value["version"], 1);
        assert_eq!(value["format"], "json");
        assert!(value["entries"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_version_checked_before_entries() {
        let blob = br#"{"magic":"OBPR","version":7,"format":"json","entries":"garbage"}"#;
        assert_eq!(
            JsonSerializer.deserialize(blob).unwrap_err(),
            PrefsError::VersionMismatch {
                expected: BLOB_VERSION,
                found: 7
            }
        );
    }

    #[test]
    fn test_declared_binary_format_is_mismatch() {
        let blob = br#"{"magic":"OBPR","version":1,"format":"binary","entries":{}}"#;
        assert!(matches!(
            JsonSerializer.deserialize(blob),
            Err(PrefsError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_magic_is_corruption() {
        let blob = br#"{"magic":"NOPE","version":1,"format":"json","entries":{}}"#;
        assert!(matches!(
            JsonSerializer.deserialize(blob),
            Err(PrefsError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_malformed_entry_is_corruption() {
        let blob = br#"{"magic":"OBPR","version":1,"format":"json","entries":{"a":{"data_type":"quaternion","salt":0,"checksum":0,"payload":[]}}}"#;
        assert!(JsonSerializer.deserialize(blob).unwrap_err().is_corrupt());
    }
}
