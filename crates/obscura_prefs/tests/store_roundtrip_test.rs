//! Integration test for save/load round-trips and failure modes.

use obscura_core::{ObscuredDouble, ObscuredInt, Vector3};
use obscura_prefs::{
    FileBackend, MemoryBackend, PrefsError, PrefsSettings, PrefsStore, SerializationKind,
    SerializationSettings, StoreKey,
};
use std::sync::Arc;
use std::thread;

const KINDS: [SerializationKind; 2] = [SerializationKind::Binary, SerializationKind::Json];

fn key() -> StoreKey {
    StoreKey::from_passphrase("integration")
}

fn memory_store(kind: SerializationKind) -> (MemoryBackend, PrefsStore) {
    let backend = MemoryBackend::new();
    let store = PrefsStore::new(key(), &SerializationSettings { kind }, Box::new(backend.clone()));
    (backend, store)
}

fn temp_prefs_path(tag: &str) -> std::path::PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_prefs_{tag}_{id}.obpr"))
}

#[test]
fn test_empty_store_roundtrip() {
    for kind in KINDS {
        let (backend, store) = memory_store(kind);
        store.save().unwrap();

        let reopened = PrefsStore::new(key(), &SerializationSettings { kind }, Box::new(backend));
        assert_eq!(reopened.load().unwrap(), 0);
        assert!(reopened.is_empty());
    }
}

#[test]
fn test_entries_roundtrip() {
    for kind in KINDS {
        let (backend, store) = memory_store(kind);
        store.set("a", &1i32).unwrap();
        store.set("b", &"x".to_string()).unwrap();
        store.save().unwrap();

        let reopened = PrefsStore::new(key(), &SerializationSettings { kind }, Box::new(backend));
        reopened.load().unwrap();
        assert_eq!(reopened.keys(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(reopened.get::<i32>("a").unwrap(), Some(1));
        assert_eq!(reopened.get::<String>("b").unwrap(), Some("x".to_string()));
    }
}

#[test]
fn test_truncated_blob_is_corrupt() {
    for kind in KINDS {
        let (backend, store) = memory_store(kind);
        store.set("a", &1i32).unwrap();
        store.set("b", &"x".to_string()).unwrap();
        store.save().unwrap();

        let mut blob = backend.snapshot().unwrap();
        blob.pop();
        backend.set_blob(blob);

        let err = store.load().unwrap_err();
        assert!(matches!(err, PrefsError::Corrupt { .. }), "{kind:?}: {err:?}");
        assert!(!err.is_missing());
    }
}

#[test]
fn test_missing_and_empty_are_not_corrupt() {
    let (backend, store) = memory_store(SerializationKind::Binary);
    let missing = store.load().unwrap_err();
    assert_eq!(missing, PrefsError::Missing);
    assert!(missing.is_missing() && !missing.is_corrupt());

    backend.set_blob(Vec::new());
    let empty = store.load().unwrap_err();
    assert_eq!(empty, PrefsError::Empty);
    assert!(empty.is_missing() && !empty.is_corrupt());
}

#[test]
fn test_switching_format_is_rejected() {
    let (backend, binary_store) = memory_store(SerializationKind::Binary);
    binary_store.set("a", &1i32).unwrap();
    binary_store.save().unwrap();

    let json_store = PrefsStore::new(
        key(),
        &SerializationSettings {
            kind: SerializationKind::Json,
        },
        Box::new(backend),
    );
    assert_eq!(
        json_store.load().unwrap_err(),
        PrefsError::FormatMismatch {
            expected: SerializationKind::Json,
            found: SerializationKind::Binary,
        }
    );
}

#[test]
fn test_wrong_key_cannot_read_entries() {
    let (backend, store) = memory_store(SerializationKind::Binary);
    store.set("gems", &250u32).unwrap();
    store.save().unwrap();

    let thief = PrefsStore::new(
        StoreKey::from_passphrase("guess"),
        &SerializationSettings::default(),
        Box::new(backend),
    );
    thief.load().unwrap();
    assert!(matches!(
        thief.get::<u32>("gems"),
        Err(PrefsError::IntegrityViolation { .. })
    ));
}

#[test]
fn test_file_store_roundtrip() {
    let path = temp_prefs_path("file");
    let settings = PrefsSettings {
        file: path.clone(),
        serialization: SerializationSettings {
            kind: SerializationKind::Json,
        },
    };

    let store = PrefsStore::from_settings(key(), &settings).unwrap();
    assert!(!store.load_or_default().unwrap());
    store.set("hp", &ObscuredInt::new(75)).unwrap();
    store.set("xp", &ObscuredDouble::new(1234.5)).unwrap();
    store.set("spawn", &Vector3::new(1.0, 64.0, -3.0)).unwrap();
    store.save().unwrap();

    let reopened = PrefsStore::from_settings(key(), &settings).unwrap();
    assert!(reopened.load_or_default().unwrap());
    assert_eq!(reopened.get::<ObscuredInt>("hp").unwrap().unwrap(), 75);
    assert_eq!(reopened.get::<f64>("xp").unwrap(), Some(1234.5));
    assert_eq!(reopened.get::<Vector3>("spawn").unwrap(), Some(Vector3::new(1.0, 64.0, -3.0)));

    let backend = FileBackend::new(&path);
    assert_eq!(backend.path(), path.as_path());
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_concurrent_writers() {
    let (_, store) = memory_store(SerializationKind::Binary);
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100i32 {
                    store.set(&format!("t{t}_{i}"), &i).unwrap();
                }
                store.save().unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 800);
    store.load().unwrap();
    assert_eq!(store.len(), 800);
    assert_eq!(store.get::<i32>("t3_42").unwrap(), Some(42));
}
