//! # Entry Envelope
//!
//! Each preference is stored as an [`ObscuredPrefsData`]: the plaintext
//! bytes XORed with a keystream, a type tag, and a CRC32 of the plaintext.
//!
//! ## Keystream
//!
//! ```text
//! block i = SipHash-2-4_128(store key; entry name || salt || i)
//! payload = plaintext XOR (block 0 || block 1 || ...)
//! ```
//!
//! The salt is drawn per write, so the same value written twice never
//! produces the same payload. The entry name is mixed in, so payloads cannot
//! be swapped between keys.

use crate::error::{PrefsError, PrefsResult};
use obscura_core::{keys, ObscureCodec, Obscured, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use siphasher::sip128::{Hasher128, SipHasher24};
use std::fmt;
use std::hash::Hasher;

/// Longest entry name a blob can hold, in bytes.
pub const MAX_NAME_LEN: usize = 65_535;

/// Largest encrypted payload a blob can hold, in bytes.
pub const MAX_PAYLOAD_LEN: usize = 0xFFFF_FFFF;

/// Stored type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum StorageDataType {
    /// `i32`.
    Int = 1,
    /// `u32`.
    UInt = 2,
    /// `i64`.
    Long = 3,
    /// `u64`.
    ULong = 4,
    /// `f32`.
    Float = 5,
    /// `f64`.
    Double = 6,
    /// `bool`.
    Bool = 7,
    /// UTF-8 string.
    String = 8,
    /// Raw bytes.
    Bytes = 9,
    /// [`Vector2`].
    Vector2 = 10,
    /// [`Vector3`].
    Vector3 = 11,
}

impl StorageDataType {
    /// Converts from the binary tag.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Int),
            2 => Some(Self::UInt),
            3 => Some(Self::Long),
            4 => Some(Self::ULong),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            7 => Some(Self::Bool),
            8 => Some(Self::String),
            9 => Some(Self::Bytes),
            10 => Some(Self::Vector2),
            11 => Some(Self::Vector3),
            _ => None,
        }
    }
}

/// Persisted envelope for one entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObscuredPrefsData {
    /// Stored type.
    pub data_type: StorageDataType,
    /// Per-write keystream salt.
    pub salt: u32,
    /// CRC32 of the plaintext bytes.
    pub checksum: u32,
    /// Encrypted plaintext bytes.
    pub payload: Vec<u8>,
}

/// Store-wide crypto key.
///
/// Never persisted by the store; the host derives it (device id, account
/// secret) and supplies it on every run.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StoreKey {
    k0: u64,
    k1: u64,
}

impl StoreKey {
    /// Domain separation for passphrase derivation.
    const PASSPHRASE_KEYS: (u64, u64) = (0x4F42_5343_5552_4131, 0x5052_4546_534B_4559);

    /// Creates a key from raw halves.
    #[must_use]
    pub const fn new(k0: u64, k1: u64) -> Self {
        Self { k0, k1 }
    }

    /// Derives a key from a passphrase.
    #[must_use]
    pub fn from_passphrase(passphrase: &str) -> Self {
        let (k0, k1) = Self::PASSPHRASE_KEYS;
        let mut hasher = SipHasher24::new_with_keys(k0, k1);
        hasher.write(passphrase.as_bytes());
        let hash = hasher.finish128();
        Self::new(hash.h1, hash.h2)
    }

    /// Draws a random key.
    #[must_use]
    pub fn random() -> Self {
        let half = || (u64::from(keys::random_u32()) << 32) | u64::from(keys::random_u32());
        Self::new(half(), half())
    }

    /// XORs `data` with the keystream for `name` and `salt`.
    fn apply_keystream(&self, name: &str, salt: u32, data: &mut [u8]) {
        let mut block = 0u64;
        for chunk in data.chunks_mut(16) {
            let mut hasher = SipHasher24::new_with_keys(self.k0, self.k1);
            hasher.write(name.as_bytes());
            hasher.write_u32(salt);
            hasher.write_u64(block);
            let hash = hasher.finish128();

            let mut stream = [0u8; 16];
            stream[..8].copy_from_slice(&hash.h1.to_le_bytes());
            stream[8..].copy_from_slice(&hash.h2.to_le_bytes());
            for (byte, key) in chunk.iter_mut().zip(stream) {
                *byte ^= key;
            }
            block += 1;
        }
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey(..)")
    }
}

/// A type the store can persist.
pub trait StorageValue: Sized {
    /// Tag written into the envelope.
    const DATA_TYPE: StorageDataType;

    /// Plaintext bytes.
    fn to_storage_bytes(&self) -> Vec<u8>;

    /// Parses plaintext bytes; `None` if malformed.
    fn from_storage_bytes(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_storage_numeric {
    ($($t:ty => $tag:ident),* $(,)?) => {
        $(
            impl StorageValue for $t {
                const DATA_TYPE: StorageDataType = StorageDataType::$tag;

                fn to_storage_bytes(&self) -> Vec<u8> {
                    self.to_le_bytes().to_vec()
                }

                fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
                    Some(<$t>::from_le_bytes(bytes.try_into().ok()?))
                }
            }
        )*
    };
}

impl_storage_numeric!(i32 => Int, u32 => UInt, i64 => Long, u64 => ULong);

impl StorageValue for f32 {
    const DATA_TYPE: StorageDataType = StorageDataType::Float;

    fn to_storage_bytes(&self) -> Vec<u8> {
        self.to_bits().to_le_bytes().to_vec()
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self::from_bits(u32::from_le_bytes(bytes.try_into().ok()?)))
    }
}

impl StorageValue for f64 {
    const DATA_TYPE: StorageDataType = StorageDataType::Double;

    fn to_storage_bytes(&self) -> Vec<u8> {
        self.to_bits().to_le_bytes().to_vec()
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self::from_bits(u64::from_le_bytes(bytes.try_into().ok()?)))
    }
}

impl StorageValue for bool {
    const DATA_TYPE: StorageDataType = StorageDataType::Bool;

    fn to_storage_bytes(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }
}

impl StorageValue for String {
    const DATA_TYPE: StorageDataType = StorageDataType::String;

    fn to_storage_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        Self::from_utf8(bytes.to_vec()).ok()
    }
}

impl StorageValue for Vec<u8> {
    const DATA_TYPE: StorageDataType = StorageDataType::Bytes;

    fn to_storage_bytes(&self) -> Vec<u8> {
        self.clone()
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        Some(bytes.to_vec())
    }
}

fn floats_to_bytes(components: &[f32]) -> Vec<u8> {
    components
        .iter()
        .flat_map(|c| c.to_bits().to_le_bytes())
        .collect()
}

fn floats_from_bytes<const N: usize>(bytes: &[u8]) -> Option<[f32; N]> {
    if bytes.len() != N * 4 {
        return None;
    }
    let mut out = [0.0f32; N];
    for (slot, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
        *slot = f32::from_bits(u32::from_le_bytes(chunk.try_into().ok()?));
    }
    Some(out)
}

impl StorageValue for Vector2 {
    const DATA_TYPE: StorageDataType = StorageDataType::Vector2;

    fn to_storage_bytes(&self) -> Vec<u8> {
        floats_to_bytes(&self.to_array())
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        floats_from_bytes::<2>(bytes).map(Self::from_array)
    }
}

impl StorageValue for Vector3 {
    const DATA_TYPE: StorageDataType = StorageDataType::Vector3;

    fn to_storage_bytes(&self) -> Vec<u8> {
        floats_to_bytes(&self.to_array())
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        floats_from_bytes::<3>(bytes).map(Self::from_array)
    }
}

/// Obscured values persist their plaintext and come back with a fresh key.
impl<T: ObscureCodec + StorageValue> StorageValue for Obscured<T> {
    const DATA_TYPE: StorageDataType = T::DATA_TYPE;

    fn to_storage_bytes(&self) -> Vec<u8> {
        self.value().to_storage_bytes()
    }

    fn from_storage_bytes(bytes: &[u8]) -> Option<Self> {
        T::from_storage_bytes(bytes).map(Self::new)
    }
}

/// Wraps `value` in an envelope for entry `name`.
#[must_use]
pub fn serialize_storage_data_type<T: StorageValue>(key: &StoreKey, name: &str, value: &T) -> ObscuredPrefsData {
    let mut payload = value.to_storage_bytes();
    let checksum = crc32fast::hash(&payload);
    let salt = keys::random_u32();
    key.apply_keystream(name, salt, &mut payload);
    ObscuredPrefsData {
        data_type: T::DATA_TYPE,
        salt,
        checksum,
        payload,
    }
}

/// Opens the envelope of entry `name`.
///
/// # Errors
///
/// - [`PrefsError::TypeMismatch`] if the entry holds another type
/// - [`PrefsError::IntegrityViolation`] if the checksum fails (wrong key,
///   renamed entry, edited payload)
/// - [`PrefsError::Corrupt`] if the plaintext does not parse as `T`
pub fn deserialize_storage_data_type<T: StorageValue>(
    key: &StoreKey,
    name: &str,
    data: &ObscuredPrefsData,
) -> PrefsResult<T> {
    if data.data_type != T::DATA_TYPE {
        return Err(PrefsError::TypeMismatch {
            key: name.to_string(),
            expected: T::DATA_TYPE,
            found: data.data_type,
        });
    }
    let plain = open_envelope(key, name, data)?;
    T::from_storage_bytes(&plain)
        .ok_or_else(|| PrefsError::corrupt(format!("entry '{name}' is not a valid {:?}", data.data_type)))
}

/// Checks the envelope of entry `name` without parsing it.
///
/// # Errors
///
/// Returns [`PrefsError::IntegrityViolation`] if the checksum fails.
pub fn verify_entry(key: &StoreKey, name: &str, data: &ObscuredPrefsData) -> PrefsResult<()> {
    open_envelope(key, name, data).map(drop)
}

fn open_envelope(key: &StoreKey, name: &str, data: &ObscuredPrefsData) -> PrefsResult<Vec<u8>> {
    let mut plain = data.payload.clone();
    key.apply_keystream(name, data.salt, &mut plain);
    if crc32fast::hash(&plain) != data.checksum {
        return Err(PrefsError::IntegrityViolation {
            key: name.to_string(),
        });
    }
    Ok(plain)
}
