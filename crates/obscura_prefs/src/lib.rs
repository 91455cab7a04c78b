//! # OBSCURA Prefs - The Vault
//!
//! Encrypted preferences persisted as a single self-describing blob.
//!
//! ## Architecture
//!
//! ```text
//!   PrefsStore ──► ObscuredPrefsData per key ──► PrefsSerializer ──► PrefsBackend
//!                  (type, salt, crc, payload)    Binary | Json       File | Memory
//! ```
//!
//! ## Failure Modes
//!
//! | Saved blob            | `load()` result                    |
//! |-----------------------|------------------------------------|
//! | never written         | `PrefsError::Missing`              |
//! | zero bytes            | `PrefsError::Empty`                |
//! | truncated / edited    | `PrefsError::Corrupt`              |
//! | other format          | `PrefsError::FormatMismatch`       |
//! | newer version         | `PrefsError::VersionMismatch`      |
//!
//! ## Example
//!
//! ```rust
//! use obscura_prefs::{MemoryBackend, PrefsStore, SerializationSettings, StoreKey};
//!
//! let store = PrefsStore::new(
//!     StoreKey::from_passphrase("device-id"),
//!     &SerializationSettings::default(),
//!     Box::new(MemoryBackend::new()),
//! );
//! store.set("gold", &900i32).unwrap();
//! store.save().unwrap();
//! store.load().unwrap();
//! assert_eq!(store.get::<i32>("gold").unwrap(), Some(900));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod envelope;
pub mod error;
pub mod serializer;
pub mod settings;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, PrefsBackend};
pub use envelope::{
    deserialize_storage_data_type, serialize_storage_data_type, verify_entry, ObscuredPrefsData,
    StorageDataType, StorageValue, StoreKey, MAX_NAME_LEN, MAX_PAYLOAD_LEN,
};
pub use error::{PrefsError, PrefsResult};
pub use serializer::{
    sniff_kind, BinarySerializer, JsonSerializer, PrefsEntries, PrefsSerializer, StorageSerializer,
};
pub use settings::{PrefsSettings, SerializationKind, SerializationSettings};
pub use store::PrefsStore;
