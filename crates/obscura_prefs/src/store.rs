//! # Preference Store
//!
//! Typed key/value preferences held as encrypted envelopes in memory and
//! persisted as one blob.
//!
//! ```text
//!   set("gold", 900) ─► envelope ─┐
//!                                 ▼
//!                    ┌─────────────────────────┐  save()   ┌─────────┐
//!                    │ Mutex<BTreeMap<envelope>>│ ───────► │ backend │
//!                    └─────────────────────────┘ ◄─────── └─────────┘
//!                                 │                load()
//!   get::<i32>("gold") ◄──────────┘
//! ```
//!
//! Plaintext exists only for the duration of a `set`/`get` call.

use crate::backend::{FileBackend, PrefsBackend};
use crate::envelope::{
    deserialize_storage_data_type, serialize_storage_data_type, StorageValue, StoreKey, MAX_NAME_LEN,
    MAX_PAYLOAD_LEN,
};
use crate::error::{check_len, PrefsResult};
use crate::serializer::{PrefsEntries, PrefsSerializer, StorageSerializer};
use crate::settings::{PrefsSettings, SerializationKind, SerializationSettings};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct StoreInner {
    entries: PrefsEntries,
    dirty: bool,
}

/// Encrypted preference store.
pub struct PrefsStore {
    key: StoreKey,
    serializer: PrefsSerializer,
    backend: Box<dyn PrefsBackend>,
    inner: Mutex<StoreInner>,
}

impl PrefsStore {
    /// Creates an empty store. Nothing is read until [`load`](Self::load).
    pub fn new(key: StoreKey, settings: &SerializationSettings, backend: Box<dyn PrefsBackend>) -> Self {
        Self {
            key,
            serializer: PrefsSerializer::from_settings(settings),
            backend,
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Creates an empty store over the file named in `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::InvalidConfig`](crate::PrefsError::InvalidConfig) if the settings are invalid.
    pub fn from_settings(key: StoreKey, settings: &PrefsSettings) -> PrefsResult<Self> {
        settings.validate()?;
        Ok(Self::new(
            key,
            &settings.serialization,
            Box::new(FileBackend::new(settings.file.clone())),
        ))
    }

    /// Blob format this store reads and writes.
    #[must_use]
    pub fn kind(&self) -> SerializationKind {
        self.serializer.kind()
    }

    /// Stores `value` under `name`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::TooLarge`](crate::PrefsError::TooLarge) if the name
    /// or the encoded value cannot be saved. The store is left unchanged.
    pub fn set<T: StorageValue>(&self, name: &str, value: &T) -> PrefsResult<()> {
        check_len("entry name", name.len(), MAX_NAME_LEN)?;
        let data = serialize_storage_data_type(&self.key, name, value);
        check_len("payload", data.payload.len(), MAX_PAYLOAD_LEN)?;
        let mut inner = self.inner.lock();
        inner.entries.insert(name.to_string(), data);
        inner.dirty = true;
        Ok(())
    }

    /// Reads the entry `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::TypeMismatch`](crate::PrefsError::TypeMismatch) or
    /// [`PrefsError::IntegrityViolation`](crate::PrefsError::IntegrityViolation) if the entry exists but cannot
    /// be read as `T`.
    pub fn get<T: StorageValue>(&self, name: &str) -> PrefsResult<Option<T>> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(name)
            .map(|data| deserialize_storage_data_type(&self.key, name, data))
            .transpose()
    }

    /// Reads the entry `name`, falling back to `default` if it is absent or
    /// unreadable.
    pub fn get_or<T: StorageValue>(&self, name: &str, default: T) -> T {
        match self.get(name) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                tracing::warn!("Prefs entry '{}' unreadable, using default: {}", name, e);
                default
            }
        }
    }

    /// Returns true if an entry named `name` exists.
    #[must_use]
    pub fn has_key(&self, name: &str) -> bool {
        self.inner.lock().entries.contains_key(name)
    }

    /// Removes the entry `name`. Returns true if it existed.
    pub fn delete_key(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.entries.remove(name).is_some();
        inner.dirty |= removed;
        removed
    }

    /// Removes every entry.
    pub fn delete_all(&self) {
        let mut inner = self.inner.lock();
        if !inner.entries.is_empty() {
            inner.entries.clear();
            inner.dirty = true;
        }
    }

    /// Entry names in order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Returns true if entries changed since the last save or load.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.lock().dirty
    }

    /// Writes every entry to the backend. Returns the blob size.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Io`](crate::PrefsError::Io) if the backend fails; the store stays
    /// dirty.
    pub fn save(&self) -> PrefsResult<usize> {
        let mut inner = self.inner.lock();
        let blob = self.serializer.serialize(&inner.entries)?;
        self.backend.write(&blob)?;
        inner.dirty = false;
        tracing::debug!(
            "Saved {} prefs entries ({} bytes, {:?})",
            inner.entries.len(),
            blob.len(),
            self.serializer.kind()
        );
        Ok(blob.len())
    }

    /// Replaces every entry with the saved blob. Returns the entry count.
    ///
    /// # Errors
    ///
    /// Returns `Missing`/`Empty` if nothing usable was saved and a corrupt
    /// variant if the blob is damaged. In-memory entries are untouched on
    /// error.
    pub fn load(&self) -> PrefsResult<usize> {
        let mut inner = self.inner.lock();
        let blob = self.backend.read()?;
        let entries = self.serializer.deserialize(&blob)?;
        let count = entries.len();
        inner.entries = entries;
        inner.dirty = false;
        tracing::debug!("Loaded {} prefs entries ({} bytes)", count, blob.len());
        Ok(count)
    }

    /// Like [`load`](Self::load), but a missing or empty blob yields an
    /// empty store. Returns true if a blob was loaded.
    ///
    /// # Errors
    ///
    /// Corruption and I/O errors are still returned so the caller can choose
    /// between resetting and aborting.
    pub fn load_or_default(&self) -> PrefsResult<bool> {
        match self.load() {
            Ok(_) => Ok(true),
            Err(e) if e.is_missing() => {
                tracing::debug!("No saved prefs ({}), starting empty", e);
                let mut inner = self.inner.lock();
                inner.entries.clear();
                inner.dirty = false;
                Ok(false)
            }
            Err(e) => {
                if e.is_corrupt() {
                    tracing::warn!("Saved prefs rejected: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Removes the saved blob and every entry.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError::Io`](crate::PrefsError::Io) if the backend fails.
    pub fn reset(&self) -> PrefsResult<()> {
        let mut inner = self.inner.lock();
        self.backend.clear()?;
        inner.entries.clear();
        inner.dirty = false;
        Ok(())
    }
}

impl std::fmt::Debug for PrefsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefsStore")
            .field("kind", &self.serializer.kind())
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::PrefsError;
    use obscura_core::{ObscuredFloat, Vector2};

    fn store(kind: SerializationKind) -> (MemoryBackend, PrefsStore) {
        let backend = MemoryBackend::new();
        let store = PrefsStore::new(
            StoreKey::from_passphrase("test"),
            &SerializationSettings { kind },
            Box::new(backend.clone()),
        );
        (backend, store)
    }

    #[test]
    fn test_set_get_delete() {
        let (_, store) = store(SerializationKind::Binary);
        assert!(store.is_empty());
        store.set("level", &3i32).unwrap();
        store.set("pos", &Vector2::new(1.0, 2.0)).unwrap();
        assert!(store.has_key("level"));
        assert_eq!(store.get::<i32>("level").unwrap(), Some(3));
        assert_eq!(store.get::<Vector2>("pos").unwrap(), Some(Vector2::new(1.0, 2.0)));
        assert_eq!(store.get::<i32>("missing").unwrap(), None);
        assert_eq!(store.keys(), vec!["level".to_string(), "pos".to_string()]);

        assert!(store.delete_key("level"));
        assert!(!store.delete_key("level"));
        store.delete_all();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_get_or_falls_back() {
        let (_, store) = store(SerializationKind::Binary);
        store.set("name", &"ann".to_string()).unwrap();
        assert_eq!(store.get_or("volume", 0.8f32), 0.8);
        // Wrong type: default, not a panic.
        assert_eq!(store.get_or("name", 7u32), 7);
    }

    #[test]
    fn test_obscured_value_roundtrip() {
        let (_, store) = store(SerializationKind::Json);
        store.set("speed", &ObscuredFloat::new(4.5)).unwrap();
        store.save().unwrap();
        store.delete_all();
        store.load().unwrap();
        let speed: ObscuredFloat = store.get("speed").unwrap().unwrap();
        assert_eq!(speed, 4.5);
    }

    #[test]
    fn test_dirty_tracking() {
        let (_, store) = store(SerializationKind::Binary);
        assert!(!store.is_dirty());
        store.set("a", &1u64).unwrap();
        assert!(store.is_dirty());
        store.save().unwrap();
        assert!(!store.is_dirty());
        assert!(!store.delete_key("nope"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_failed_load_keeps_entries() {
        let (backend, store) = store(SerializationKind::Binary);
        store.set("gold", &10i32).unwrap();
        backend.set_blob(b"OBPR-garbage-garbage".to_vec());
        assert!(store.load().unwrap_err().is_corrupt());
        assert_eq!(store.get::<i32>("gold").unwrap(), Some(10));
    }

    #[test]
    fn test_load_or_default() {
        let (backend, store) = store(SerializationKind::Binary);
        assert!(!store.load_or_default().unwrap());

        backend.set_blob(Vec::new());
        assert!(!store.load_or_default().unwrap());

        store.set("x", &true).unwrap();
        store.save().unwrap();
        assert!(store.load_or_default().unwrap());

        backend.set_blob(vec![0xFF; 32]);
        assert!(store.load_or_default().is_err());
    }

    #[test]
    fn test_oversize_name_rejected_at_set() {
        let (_, store) = store(SerializationKind::Binary);
        store.set("ok", &1i32).unwrap();
        store.save().unwrap();

        let name = "n".repeat(MAX_NAME_LEN + 1);
        let err = store.set(&name, &2i32).unwrap_err();
        assert_eq!(
            err,
            PrefsError::TooLarge {
                what: "entry name",
                len: MAX_NAME_LEN + 1,
                max: MAX_NAME_LEN,
            }
        );
        assert!(!err.is_corrupt());
        assert!(!store.has_key(&name));
        assert!(!store.is_dirty());
        store.save().unwrap();

        store.set(&"n".repeat(MAX_NAME_LEN), &3i32).unwrap();
        store.save().unwrap();
        store.load().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reset_clears_backend() {
        let (backend, store) = store(SerializationKind::Binary);
        store.set("x", &1i32).unwrap();
        store.save().unwrap();
        store.reset().unwrap();
        assert!(store.is_empty());
        assert!(backend.snapshot().is_none());
    }
}
