//! # Binary Blob
//!
//! ```text
//! [4 bytes: magic "OBPR"]
//! [2 bytes: version]
//! [1 byte: format (1 = binary)]
//! [4 bytes: entry count]
//!
//! Entry format:
//! [2 bytes: name length] [N bytes: name, UTF-8]
//! [1 byte: data type]
//! [4 bytes: salt]
//! [4 bytes: plaintext CRC32]
//! [4 bytes: payload length] [M bytes: payload]
//!
//! [4 bytes: CRC32 of everything above]
//! ```
//!
//! All integers little-endian.

use super::{sniff_kind, PrefsEntries, StorageSerializer, BLOB_MAGIC, BLOB_VERSION};
use crate::envelope::{ObscuredPrefsData, StorageDataType, MAX_NAME_LEN, MAX_PAYLOAD_LEN};
use crate::error::{check_len, PrefsError, PrefsResult};
use crate::settings::SerializationKind;

/// Header bytes before the first entry.
const HEADER_LEN: usize = 4 + 2 + 1 + 4;

/// Trailing checksum bytes.
const TRAILER_LEN: usize = 4;

/// Compact binary serializer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BinarySerializer;

impl StorageSerializer for BinarySerializer {
    fn kind(&self) -> SerializationKind {
        SerializationKind::Binary
    }

    fn serialize(&self, entries: &PrefsEntries) -> PrefsResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(HEADER_LEN + TRAILER_LEN + entries.len() * 32);
        buf.extend_from_slice(BLOB_MAGIC);
        buf.extend_from_slice(&BLOB_VERSION.to_le_bytes());
        buf.push(SerializationKind::Binary.format_byte());
        buf.extend_from_slice(&length_u32(entries.len(), "entry count")?.to_le_bytes());

        for (name, data) in entries {
            check_len("entry name", name.len(), MAX_NAME_LEN)?;
            let name_len = u16::try_from(name.len()).map_err(|_| PrefsError::TooLarge {
                what: "entry name",
                len: name.len(),
                max: MAX_NAME_LEN,
            })?;
            buf.extend_from_slice(&name_len.to_le_bytes());
            buf.extend_from_slice(name.as_bytes());
            buf.push(data.data_type as u8);
            buf.extend_from_slice(&data.salt.to_le_bytes());
            buf.extend_from_slice(&data.checksum.to_le_bytes());
            check_len("payload", data.payload.len(), MAX_PAYLOAD_LEN)?;
            buf.extend_from_slice(&length_u32(data.payload.len(), "payload")?.to_le_bytes());
            buf.extend_from_slice(&data.payload);
        }

        let crc = crc32fast::hash(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }

    fn deserialize(&self, blob: &[u8]) -> PrefsResult<PrefsEntries> {
        if blob.is_empty() {
            return Err(PrefsError::Empty);
        }
        if sniff_kind(blob) == Some(SerializationKind::Json) {
            return Err(PrefsError::FormatMismatch {
                expected: SerializationKind::Binary,
                found: SerializationKind::Json,
            });
        }
        if blob.len() < HEADER_LEN + TRAILER_LEN {
            return Err(PrefsError::corrupt(format!("blob truncated at {} bytes", blob.len())));
        }
        if &blob[..4] != BLOB_MAGIC {
            return Err(PrefsError::corrupt("invalid blob magic"));
        }

        let (body, trailer) = blob.split_at(blob.len() - TRAILER_LEN);
        let mut stored_crc = [0u8; 4];
        stored_crc.copy_from_slice(trailer);
        if crc32fast::hash(body) != u32::from_le_bytes(stored_crc) {
            return Err(PrefsError::corrupt("blob checksum mismatch"));
        }

        let mut reader = Reader::new(&body[4..]);
        let version = reader.u16()?;
        if version != BLOB_VERSION {
            return Err(PrefsError::VersionMismatch {
                expected: BLOB_VERSION,
                found: version,
            });
        }
        let format = reader.u8()?;
        match SerializationKind::from_format_byte(format) {
            Some(SerializationKind::Binary) => {}
            Some(found) => {
                return Err(PrefsError::FormatMismatch {
                    expected: SerializationKind::Binary,
                    found,
                })
            }
            None => return Err(PrefsError::corrupt(format!("unknown format byte {format}"))),
        }

        let count = reader.u32()?;
        let mut entries = PrefsEntries::new();
        for _ in 0..count {
            let name_len = usize::from(reader.u16()?);
            let name = std::str::from_utf8(reader.take(name_len)?)
                .map_err(|_| PrefsError::corrupt("entry name is not UTF-8"))?
                .to_string();
            let tag = reader.u8()?;
            let data_type = StorageDataType::from_u8(tag)
                .ok_or_else(|| PrefsError::corrupt(format!("unknown data type {tag} for entry '{name}'")))?;
            let salt = reader.u32()?;
            let checksum = reader.u32()?;
            let payload_len = reader.len_u32()?;
            let payload = reader.take(payload_len)?.to_vec();

            let data = ObscuredPrefsData {
                data_type,
                salt,
                checksum,
                payload,
            };
            if entries.insert(name.clone(), data).is_some() {
                return Err(PrefsError::corrupt(format!("duplicate entry '{name}'")));
            }
        }

        if !reader.is_empty() {
            return Err(PrefsError::corrupt(format!("{} trailing bytes", reader.remaining())));
        }
        Ok(entries)
    }
}

fn length_u32(len: usize, what: &'static str) -> PrefsResult<u32> {
    u32::try_from(len).map_err(|_| PrefsError::TooLarge {
        what,
        len,
        max: MAX_PAYLOAD_LEN,
    })
}

/// Bounds-checked little-endian cursor.
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn take(&mut self, len: usize) -> PrefsResult<&'a [u8]> {
        if self.data.len() < len {
            return Err(PrefsError::corrupt(format!(
                "unexpected end of blob: need {len} bytes, have {}",
                self.data.len()
            )));
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> PrefsResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> PrefsResult<u8> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> PrefsResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> PrefsResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn len_u32(&mut self) -> PrefsResult<usize> {
        let len = self.u32()?;
        usize::try_from(len).map_err(|_| PrefsError::corrupt(format!("length {len} exceeds address space")))
    }

    const fn remaining(&self) -> usize {
        self.data.len()
    }

    const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
