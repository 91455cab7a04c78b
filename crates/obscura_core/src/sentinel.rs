//! # Fake-Value Sentinel
//!
//! Every legitimate write goes through `set_value`, which updates the
//! encoding and the decoy together. A memory editor that freezes or rewrites
//! either one alone breaks `decode(encrypted, key) == fake`.
//!
//! The check is advisory: it never panics and never errors. Uninitialized
//! instances and instances without an active decoy always report valid.

use crate::codec::ObscureCodec;
use crate::obscured::Obscured;
use crate::tolerance::Tolerances;

/// Integrity check over a value with a decoy copy.
pub trait DataIntegrity {
    /// Checks the decoy against the decoded value using `tolerances`.
    fn is_data_valid_within(&self, tolerances: &Tolerances) -> bool;

    /// Checks the decoy using default tolerances.
    fn is_data_valid(&self) -> bool {
        self.is_data_valid_within(&Tolerances::default())
    }

    /// Type name for reports.
    fn type_name(&self) -> &'static str;
}

impl<T: ObscureCodec> DataIntegrity for Obscured<T> {
    fn is_data_valid_within(&self, tolerances: &Tolerances) -> bool {
        if !self.inited || !self.fake_active {
            return true;
        }
        let decoded = T::decrypt(self.encrypted, self.key);
        T::approx_eq(decoded, self.fake, T::tolerance(tolerances))
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector2;
    use crate::obscured::{ObscuredDouble, ObscuredInt, ObscuredLong, ObscuredVector2};

    #[test]
    fn test_setter_keeps_sentinel_valid() {
        let mut v = ObscuredInt::new(10);
        for i in 0..1000 {
            v.set_value(i);
            v += 1;
        }
        assert!(v.is_data_valid());
    }

    #[test]
    fn test_encoded_write_is_detected() {
        let mut v = ObscuredInt::new(500);
        // External write of a different encoding, decoy untouched.
        v.encrypted ^= 0x40;
        assert!(!v.is_data_valid());
    }

    #[test]
    fn test_decoy_write_is_detected() {
        let mut v = ObscuredLong::new(1_000);
        // What a value scanner finds and edits.
        v.fake = 999_999;
        assert!(!v.is_data_valid());
        assert_eq!(v.value(), 1_000);
    }

    #[test]
    fn test_uninitialized_is_valid() {
        let mut v = ObscuredDouble::default();
        v.fake = 3.0;
        assert!(v.is_data_valid());
    }

    #[test]
    fn test_inactive_decoy_is_valid() {
        let mut v = ObscuredInt::new(1);
        v.deactivate_fake();
        v.encrypted ^= 0xFF;
        assert!(v.is_data_valid());

        v.activate_fake();
        assert!(v.is_data_valid());
    }

    #[test]
    fn test_nan_is_not_a_false_positive() {
        let v = ObscuredDouble::new(f64::NAN);
        assert!(v.is_data_valid_within(&Tolerances::EXACT));
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let mut v = ObscuredVector2::new(Vector2::new(1.0, 1.0));
        v.fake = Vector2::new(1.0, 1.001);
        assert!(!v.is_data_valid());
        let loose = Tolerances {
            vector: 0.01,
            ..Tolerances::default()
        };
        assert!(v.is_data_valid_within(&loose));
        assert_eq!(v.type_name(), "Vector2");
    }
}
