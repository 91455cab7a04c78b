//! # Obscuring Codec
//!
//! `encrypt(plain, key) -> encrypted` and `decrypt(encrypted, key) -> plain`
//! for every obscurable plain type.
//!
//! ## Encoding Rules
//!
//! - **Integers**: `plain ^ key`. XOR is its own inverse, so any number of
//!   encode/decode cycles is drift-free.
//! - **Floats**: XOR on `to_bits()`. Never on the decimal value: NaN payloads
//!   and signed zeros survive bit-exact.
//! - **Bool**: one of two magic codes XOR key, so `false` never sits in
//!   memory as `0`.
//! - **Vectors**: each component's bits XOR one shared key.
//!
//! Keys are never zero, otherwise the encoded value would equal the plain one.

use crate::math::{Vector2, Vector3};
use crate::raw::{RawEncryptedVector2, RawEncryptedVector3};
use crate::tolerance::Tolerances;
use rand::{Rng, RngCore};
use std::fmt;

/// Magic code stored for `true`.
const BOOL_TRUE_CODE: i32 = 213;

/// Magic code stored for `false`.
const BOOL_FALSE_CODE: i32 = 181;

/// A plain type that can be kept obscured in memory.
pub trait ObscureCodec: Copy + Default + 'static {
    /// Per-instance key.
    type Key: Copy + Default + PartialEq + fmt::Debug;
    /// Encoded representation.
    type Encrypted: Copy + Default + PartialEq + fmt::Debug;

    /// Human-readable type name for reports.
    const TYPE_NAME: &'static str;

    /// Draws a new non-zero key.
    fn generate_key<R: RngCore>(rng: &mut R) -> Self::Key;

    /// Encodes a plain value.
    fn encrypt(plain: Self, key: Self::Key) -> Self::Encrypted;

    /// Decodes an encoded value.
    fn decrypt(encrypted: Self::Encrypted, key: Self::Key) -> Self;

    /// Bit-pattern equality. NaN equals an identical NaN.
    fn bit_eq(a: Self, b: Self) -> bool;

    /// Equality within an absolute tolerance.
    ///
    /// Exact types ignore the tolerance.
    #[inline]
    fn approx_eq(a: Self, b: Self, _tolerance: f64) -> bool {
        Self::bit_eq(a, b)
    }

    /// Picks this type's tolerance out of a tolerance table.
    #[inline]
    #[must_use]
    fn tolerance(_tolerances: &Tolerances) -> f64 {
        0.0
    }
}

/// Draws a key of an integer type, retrying on zero.
fn nonzero<T, R>(rng: &mut R) -> T
where
    R: RngCore,
    T: Default + PartialEq,
    rand::distributions::Standard: rand::distributions::Distribution<T>,
{
    loop {
        let key: T = rng.gen();
        if key != T::default() {
            return key;
        }
    }
}

macro_rules! impl_integer_codec {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl ObscureCodec for $ty {
            type Key = $ty;
            type Encrypted = $ty;

            const TYPE_NAME: &'static str = $name;

            #[inline]
            fn generate_key<R: RngCore>(rng: &mut R) -> $ty {
                nonzero(rng)
            }

            #[inline]
            fn encrypt(plain: $ty, key: $ty) -> $ty {
                plain ^ key
            }

            #[inline]
            fn decrypt(encrypted: $ty, key: $ty) -> $ty {
                encrypted ^ key
            }

            #[inline]
            fn bit_eq(a: $ty, b: $ty) -> bool {
                a == b
            }
        }
    )*};
}

impl_integer_codec! {
    i32 => "int",
    u32 => "uint",
    i64 => "long",
    u64 => "ulong",
}

impl ObscureCodec for f32 {
    type Key = u32;
    type Encrypted = u32;

    const TYPE_NAME: &'static str = "float";

    #[inline]
    fn generate_key<R: RngCore>(rng: &mut R) -> u32 {
        nonzero(rng)
    }

    #[inline]
    fn encrypt(plain: f32, key: u32) -> u32 {
        plain.to_bits() ^ key
    }

    #[inline]
    fn decrypt(encrypted: u32, key: u32) -> f32 {
        f32::from_bits(encrypted ^ key)
    }

    #[inline]
    fn bit_eq(a: f32, b: f32) -> bool {
        a.to_bits() == b.to_bits()
    }

    #[inline]
    fn approx_eq(a: f32, b: f32, tolerance: f64) -> bool {
        Self::bit_eq(a, b) || f64::from((a - b).abs()) <= tolerance
    }

    #[inline]
    fn tolerance(tolerances: &Tolerances) -> f64 {
        f64::from(tolerances.float)
    }
}

impl ObscureCodec for f64 {
    type Key = u64;
    type Encrypted = u64;

    const TYPE_NAME: &'static str = "double";

    #[inline]
    fn generate_key<R: RngCore>(rng: &mut R) -> u64 {
        nonzero(rng)
    }

    #[inline]
    fn encrypt(plain: f64, key: u64) -> u64 {
        plain.to_bits() ^ key
    }

    #[inline]
    fn decrypt(encrypted: u64, key: u64) -> f64 {
        f64::from_bits(encrypted ^ key)
    }

    #[inline]
    fn bit_eq(a: f64, b: f64) -> bool {
        a.to_bits() == b.to_bits()
    }

    #[inline]
    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        Self::bit_eq(a, b) || (a - b).abs() <= tolerance
    }

    #[inline]
    fn tolerance(tolerances: &Tolerances) -> f64 {
        tolerances.double
    }
}

impl ObscureCodec for bool {
    type Key = i32;
    type Encrypted = i32;

    const TYPE_NAME: &'static str = "bool";

    #[inline]
    fn generate_key<R: RngCore>(rng: &mut R) -> i32 {
        nonzero(rng)
    }

    #[inline]
    fn encrypt(plain: bool, key: i32) -> i32 {
        let code = if plain { BOOL_TRUE_CODE } else { BOOL_FALSE_CODE };
        code ^ key
    }

    #[inline]
    fn decrypt(encrypted: i32, key: i32) -> bool {
        (encrypted ^ key) != BOOL_FALSE_CODE
    }

    #[inline]
    fn bit_eq(a: bool, b: bool) -> bool {
        a == b
    }
}

impl ObscureCodec for Vector2 {
    type Key = u32;
    type Encrypted = RawEncryptedVector2;

    const TYPE_NAME: &'static str = "Vector2";

    #[inline]
    fn generate_key<R: RngCore>(rng: &mut R) -> u32 {
        nonzero(rng)
    }

    #[inline]
    fn encrypt(plain: Vector2, key: u32) -> RawEncryptedVector2 {
        RawEncryptedVector2 {
            x: plain.x.to_bits() ^ key,
            y: plain.y.to_bits() ^ key,
        }
    }

    #[inline]
    fn decrypt(encrypted: RawEncryptedVector2, key: u32) -> Vector2 {
        Vector2::new(
            f32::from_bits(encrypted.x ^ key),
            f32::from_bits(encrypted.y ^ key),
        )
    }

    #[inline]
    fn bit_eq(a: Vector2, b: Vector2) -> bool {
        bytemuck::bytes_of(&a) == bytemuck::bytes_of(&b)
    }

    #[inline]
    fn approx_eq(a: Vector2, b: Vector2, tolerance: f64) -> bool {
        Self::bit_eq(a, b)
            || a.to_array()
                .iter()
                .zip(b.to_array().iter())
                .all(|(x, y)| f32::approx_eq(*x, *y, tolerance))
    }

    #[inline]
    fn tolerance(tolerances: &Tolerances) -> f64 {
        f64::from(tolerances.vector)
    }
}

impl ObscureCodec for Vector3 {
    type Key = u32;
    type Encrypted = RawEncryptedVector3;

    const TYPE_NAME: &'static str = "Vector3";

    #[inline]
    fn generate_key<R: RngCore>(rng: &mut R) -> u32 {
        nonzero(rng)
    }

    #[inline]
    fn encrypt(plain: Vector3, key: u32) -> RawEncryptedVector3 {
        RawEncryptedVector3 {
            x: plain.x.to_bits() ^ key,
            y: plain.y.to_bits() ^ key,
            z: plain.z.to_bits() ^ key,
        }
    }

    #[inline]
    fn decrypt(encrypted: RawEncryptedVector3, key: u32) -> Vector3 {
        Vector3::new(
            f32::from_bits(encrypted.x ^ key),
            f32::from_bits(encrypted.y ^ key),
            f32::from_bits(encrypted.z ^ key),
        )
    }

    #[inline]
    fn bit_eq(a: Vector3, b: Vector3) -> bool {
        bytemuck::bytes_of(&a) == bytemuck::bytes_of(&b)
    }

    #[inline]
    fn approx_eq(a: Vector3, b: Vector3, tolerance: f64) -> bool {
        Self::bit_eq(a, b)
            || a.to_array()
                .iter()
                .zip(b.to_array().iter())
                .all(|(x, y)| f32::approx_eq(*x, *y, tolerance))
    }

    #[inline]
    fn tolerance(tolerances: &Tolerances) -> f64 {
        f64::from(tolerances.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roundtrip<T: ObscureCodec>(rng: &mut ChaCha8Rng, value: T) -> bool {
        let key = T::generate_key(rng);
        T::bit_eq(T::decrypt(T::encrypt(value, key), key), value)
    }

    #[test]
    fn test_integer_extremes_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for v in [0, 1, -1, i32::MIN, i32::MAX] {
            assert!(roundtrip(&mut rng, v));
        }
        for v in [0, i64::MIN, i64::MAX] {
            assert!(roundtrip(&mut rng, v));
        }
        assert!(roundtrip(&mut rng, u32::MAX));
        assert!(roundtrip(&mut rng, u64::MAX));
    }

    #[test]
    fn test_float_special_values_roundtrip_bit_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let quiet_nan_with_payload = f64::from_bits(0x7FF8_0000_0000_BEEF);
        for v in [0.0, -0.0, f64::MIN, f64::MAX, f64::INFINITY, f64::NEG_INFINITY, f64::NAN, quiet_nan_with_payload] {
            assert!(roundtrip(&mut rng, v), "f64 {v:?} did not survive");
        }
        for v in [
            0.0f32,
            -0.0,
            f32::MIN,
            f32::MAX,
            f32::MIN_POSITIVE,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::NAN,
        ] {
            assert!(roundtrip(&mut rng, v), "f32 {v:?} did not survive");
        }
    }

    #[test]
    fn test_encoding_is_deterministic_per_key() {
        let key = 0x5A5A_1234u32;
        assert_eq!(f32::encrypt(3.5, key), f32::encrypt(3.5, key));
        assert_ne!(f32::encrypt(3.5, key), 3.5f32.to_bits());
    }

    #[test]
    fn test_no_drift_after_many_cycles() {
        let mut value = 0.1f64 + 0.2;
        let original = value;
        let key = 0xDEAD_BEEF_0BAD_F00Du64;
        for _ in 0..1000 {
            value = f64::decrypt(f64::encrypt(value, key), key);
        }
        assert_eq!(value.to_bits(), original.to_bits());
    }

    #[test]
    fn test_bool_codes_hide_plain_value() {
        let key = 77;
        assert!(bool::decrypt(bool::encrypt(true, key), key));
        assert!(!bool::decrypt(bool::encrypt(false, key), key));
        assert_ne!(bool::encrypt(false, key), 0);
    }

    #[test]
    fn test_vector_roundtrip_and_raw_inequality_across_keys() {
        let v = Vector3::new(1.0, f32::NAN, -2.5);
        let a = Vector3::encrypt(v, 11);
        let b = Vector3::encrypt(v, 12);
        assert_ne!(a, b);
        assert!(Vector3::bit_eq(Vector3::decrypt(a, 11), v));
        assert!(Vector3::bit_eq(Vector3::decrypt(b, 12), v));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for v in [
            Vector2::new(f32::MIN, f32::MAX),
            Vector2::new(-0.0, f32::NAN),
            Vector2::new(f32::INFINITY, f32::NEG_INFINITY),
        ] {
            assert!(roundtrip(&mut rng, v), "{v:?} did not survive");
        }
        for v in [Vector3::new(f32::MIN, f32::MAX, 0.0), Vector3::new(f32::INFINITY, -0.0, f32::MIN_POSITIVE)] {
            assert!(roundtrip(&mut rng, v), "{v:?} did not survive");
        }
        let flat = Vector2::new(4.0, -8.5);
        assert_ne!(Vector2::encrypt(flat, 5), Vector2::encrypt(flat, 6));
    }

    #[test]
    fn test_approx_eq_respects_tolerance() {
        assert!(f64::approx_eq(1.0, 1.0 + 1e-13, 1e-12));
        assert!(!f64::approx_eq(1.0, 1.0 + 1e-9, 1e-12));
        assert!(f64::approx_eq(f64::NAN, f64::NAN, 0.0));
        assert!(!i32::approx_eq(1, 2, 10.0));
    }
}
