//! # Obscured Value Types
//!
//! `Obscured<T>` keeps a `T` encrypted in memory, next to a decoy plaintext
//! copy (the fake value) that memory scanners find instead.
//!
//! ## Lifecycle
//!
//! - `Obscured::new(v)` draws a key, encodes `v` and snapshots the fake value
//!   in one step.
//! - `Obscured::default()` is uninitialized: it reads as `T::default()` and
//!   draws its key on the first write.
//! - `reset()` drops back to uninitialized; the next write draws a new key.
//!
//! ## Conversions
//!
//! `From<T>` builds an initialized instance. There is deliberately no
//! conversion back to `T`: reading is always an explicit `value()`.
//!
//! ## Thread Safety
//!
//! Not synchronized. Concurrent writers can leave `encrypted` and `fake` out
//! of step, which looks exactly like tampering.

use crate::codec::ObscureCodec;
use crate::keys;
use crate::math::{Vector2, Vector3};
use crate::tolerance::Tolerances;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};

/// A value kept encrypted in memory.
#[derive(Clone, Copy)]
pub struct Obscured<T: ObscureCodec> {
    /// Encoded value.
    pub(crate) encrypted: T::Encrypted,
    /// Per-instance key.
    pub(crate) key: T::Key,
    /// Decoy plaintext copy.
    pub(crate) fake: T,
    /// Whether key and encoding are established.
    pub(crate) inited: bool,
    /// Whether the decoy is tracked.
    pub(crate) fake_active: bool,
}

/// Obscured `i32`.
pub type ObscuredInt = Obscured<i32>;
/// Obscured `u32`.
pub type ObscuredUInt = Obscured<u32>;
/// Obscured `i64`.
pub type ObscuredLong = Obscured<i64>;
/// Obscured `u64`.
pub type ObscuredULong = Obscured<u64>;
/// Obscured `f32`.
pub type ObscuredFloat = Obscured<f32>;
/// Obscured `f64`.
pub type ObscuredDouble = Obscured<f64>;
/// Obscured `bool`.
pub type ObscuredBool = Obscured<bool>;
/// Obscured [`Vector2`].
pub type ObscuredVector2 = Obscured<Vector2>;
/// Obscured [`Vector3`].
pub type ObscuredVector3 = Obscured<Vector3>;

impl<T: ObscureCodec> Obscured<T> {
    /// Creates an initialized instance under a fresh random key.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self::with_key(value, keys::generate::<T>())
    }

    /// Creates an initialized instance under an explicit key.
    #[must_use]
    pub fn with_key(value: T, key: T::Key) -> Self {
        Self {
            encrypted: T::encrypt(value, key),
            key,
            fake: value,
            inited: true,
            fake_active: true,
        }
    }

    /// Restores an instance from its encoded parts.
    ///
    /// The fake value is re-derived from the decoded value.
    #[must_use]
    pub fn from_encrypted(encrypted: T::Encrypted, key: T::Key) -> Self {
        Self {
            encrypted,
            key,
            fake: T::decrypt(encrypted, key),
            inited: true,
            fake_active: true,
        }
    }

    /// Returns the decoded value, or `T::default()` if uninitialized.
    #[inline]
    #[must_use]
    pub fn value(&self) -> T {
        if self.inited {
            T::decrypt(self.encrypted, self.key)
        } else {
            T::default()
        }
    }

    /// Writes a new value. Encoding and fake value change in the same call.
    #[inline]
    pub fn set_value(&mut self, value: T) {
        if !self.inited {
            self.key = keys::generate::<T>();
            self.inited = true;
            self.fake_active = true;
        }
        self.encrypted = T::encrypt(value, self.key);
        if self.fake_active {
            self.fake = value;
        }
    }

    /// Returns the encoded parts `(encrypted, key)` without decoding.
    #[inline]
    #[must_use]
    pub fn to_encrypted(&self) -> (T::Encrypted, T::Key) {
        (self.encrypted, self.key)
    }

    /// Returns the encoded value only.
    #[inline]
    #[must_use]
    pub fn encrypted(&self) -> T::Encrypted {
        self.encrypted
    }

    /// Replaces the encoded parts, keeping the fake value in step.
    pub fn set_encrypted(&mut self, encrypted: T::Encrypted, key: T::Key) {
        let keep_fake = self.fake_active || !self.inited;
        *self = Self::from_encrypted(encrypted, key);
        if !keep_fake {
            self.deactivate_fake();
        }
    }

    /// Re-encodes the current value under a new random key.
    pub fn randomize_key(&mut self) {
        if !self.inited {
            return;
        }
        let value = self.value();
        self.key = keys::generate::<T>();
        self.encrypted = T::encrypt(value, self.key);
    }

    /// Drops back to the uninitialized state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Starts tracking the decoy, snapshotting the current value.
    pub fn activate_fake(&mut self) {
        self.fake = self.value();
        self.fake_active = true;
    }

    /// Stops tracking the decoy and clears it.
    pub fn deactivate_fake(&mut self) {
        self.fake = T::default();
        self.fake_active = false;
    }

    /// Returns true once a key and encoding are established.
    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.inited
    }

    /// Returns true while the decoy is tracked.
    #[inline]
    #[must_use]
    pub const fn is_fake_active(&self) -> bool {
        self.fake_active
    }

    /// Compares decoded values within an explicit tolerance.
    #[must_use]
    pub fn eq_within(&self, other: &Self, tolerance: f64) -> bool {
        T::approx_eq(self.value(), other.value(), tolerance)
    }

    /// Keeps this instance's key for a derived value, or draws one.
    #[inline]
    fn derive(&self, value: T) -> Self {
        if self.inited {
            Self::with_key(value, self.key)
        } else {
            Self::new(value)
        }
    }
}

impl<T: ObscureCodec> Default for Obscured<T> {
    fn default() -> Self {
        Self {
            encrypted: T::Encrypted::default(),
            key: T::Key::default(),
            fake: T::default(),
            inited: false,
            fake_active: false,
        }
    }
}

impl<T: ObscureCodec> From<T> for Obscured<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: ObscureCodec> PartialEq for Obscured<T> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_within(other, T::tolerance(&Tolerances::default()))
    }
}

impl<T: ObscureCodec> fmt::Debug for Obscured<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obscured")
            .field("type", &T::TYPE_NAME)
            .field("encrypted", &self.encrypted)
            .field("inited", &self.inited)
            .field("fake_active", &self.fake_active)
            .finish_non_exhaustive()
    }
}

impl<T: ObscureCodec + fmt::Display> fmt::Display for Obscured<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value(), f)
    }
}

macro_rules! impl_plain_eq {
    ($($ty:ty),*) => {$(
        impl PartialEq<$ty> for Obscured<$ty> {
            fn eq(&self, other: &$ty) -> bool {
                <$ty as ObscureCodec>::approx_eq(
                    self.value(),
                    *other,
                    <$ty as ObscureCodec>::tolerance(&Tolerances::default()),
                )
            }
        }
    )*};
}

impl_plain_eq!(i32, u32, i64, u64, f32, f64, bool, Vector2, Vector3);

macro_rules! impl_binary_op {
    ($ty:ty, $rhs:ty, $op_trait:ident, $op:ident, $assign_trait:ident, $assign:ident, $sym:tt) => {
        impl $op_trait<$rhs> for Obscured<$ty> {
            type Output = Self;
            #[inline]
            fn $op(self, rhs: $rhs) -> Self {
                self.derive(self.value() $sym rhs)
            }
        }

        impl $assign_trait<$rhs> for Obscured<$ty> {
            #[inline]
            fn $assign(&mut self, rhs: $rhs) {
                self.set_value(self.value() $sym rhs);
            }
        }
    };
}

macro_rules! impl_obscured_binary_op {
    ($ty:ty, $op_trait:ident, $op:ident, $assign_trait:ident, $assign:ident, $sym:tt) => {
        impl_binary_op!($ty, $ty, $op_trait, $op, $assign_trait, $assign, $sym);

        impl $op_trait for Obscured<$ty> {
            type Output = Self;
            #[inline]
            fn $op(self, rhs: Self) -> Self {
                self.derive(self.value() $sym rhs.value())
            }
        }

        impl $assign_trait for Obscured<$ty> {
            #[inline]
            fn $assign(&mut self, rhs: Self) {
                self.set_value(self.value() $sym rhs.value());
            }
        }
    };
}

macro_rules! impl_arithmetic {
    ($($ty:ty),*) => {$(
        impl_obscured_binary_op!($ty, Add, add, AddAssign, add_assign, +);
        impl_obscured_binary_op!($ty, Sub, sub, SubAssign, sub_assign, -);
        impl_obscured_binary_op!($ty, Mul, mul, MulAssign, mul_assign, *);
        impl_obscured_binary_op!($ty, Div, div, DivAssign, div_assign, /);
        impl_obscured_binary_op!($ty, Rem, rem, RemAssign, rem_assign, %);
    )*};
}

impl_arithmetic!(i32, u32, i64, u64, f32, f64);

macro_rules! impl_vector_arithmetic {
    ($($ty:ty),*) => {$(
        impl_obscured_binary_op!($ty, Add, add, AddAssign, add_assign, +);
        impl_obscured_binary_op!($ty, Sub, sub, SubAssign, sub_assign, -);
        impl_binary_op!($ty, f32, Mul, mul, MulAssign, mul_assign, *);
        impl_binary_op!($ty, f32, Div, div, DivAssign, div_assign, /);
    )*};
}

impl_vector_arithmetic!(Vector2, Vector3);

macro_rules! impl_neg {
    ($($ty:ty),*) => {$(
        impl Neg for Obscured<$ty> {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                self.derive(-self.value())
            }
        }
    )*};
}

impl_neg!(i32, i64, f32, f64, Vector2, Vector3);
