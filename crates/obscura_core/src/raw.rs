//! # Raw Encrypted Layouts
//!
//! The literal encoded bit patterns of obscured vectors. These cross value
//! boundaries (save slots, network replication) without ever being decoded.
//!
//! Equality is bitwise on the encoded fields: the same vector under two
//! different keys produces two unequal raw values.

use bytemuck::{Pod, Zeroable};

/// Encoded bit pattern of an obscured [`Vector2`](crate::Vector2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RawEncryptedVector2 {
    /// Encoded X bits.
    pub x: u32,
    /// Encoded Y bits.
    pub y: u32,
}

/// Encoded bit pattern of an obscured [`Vector3`](crate::Vector3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RawEncryptedVector3 {
    /// Encoded X bits.
    pub x: u32,
    /// Encoded Y bits.
    pub y: u32,
    /// Encoded Z bits.
    pub z: u32,
}

impl RawEncryptedVector2 {
    /// Size in bytes.
    pub const SIZE: usize = 8;

    /// Returns the raw bytes (native endian).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl RawEncryptedVector3 {
    /// Size in bytes.
    pub const SIZE: usize = 12;

    /// Returns the raw bytes (native endian).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<RawEncryptedVector2>(), RawEncryptedVector2::SIZE);
        assert_eq!(std::mem::size_of::<RawEncryptedVector3>(), RawEncryptedVector3::SIZE);
        assert_eq!(RawEncryptedVector3::default().as_bytes().len(), 12);
    }

    #[test]
    fn test_equality_is_bitwise() {
        let a = RawEncryptedVector2 { x: 1, y: 2 };
        let b = RawEncryptedVector2 { x: 1, y: 3 };
        assert_ne!(a, b);
        assert_eq!(a, RawEncryptedVector2 { x: 1, y: 2 });
    }
}
