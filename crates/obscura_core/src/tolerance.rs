//! # Comparison Tolerances
//!
//! Floating types compare within an absolute tolerance, integer types and
//! booleans compare exactly. Tolerances are configured per type family.

use serde::{Deserialize, Serialize};

/// Default absolute tolerance for `f32` values.
pub const DEFAULT_FLOAT_TOLERANCE: f32 = 1e-6;

/// Default absolute tolerance for `f64` values.
pub const DEFAULT_DOUBLE_TOLERANCE: f64 = 1e-12;

/// Default per-component tolerance for vectors.
pub const DEFAULT_VECTOR_TOLERANCE: f32 = 1e-6;

/// Per-type absolute tolerances used by equality and integrity checks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Tolerance for `f32`.
    pub float: f32,
    /// Tolerance for `f64`.
    pub double: f64,
    /// Per-component tolerance for vectors.
    pub vector: f32,
}

impl Tolerances {
    /// Bit-exact comparison for every type.
    pub const EXACT: Self = Self {
        float: 0.0,
        double: 0.0,
        vector: 0.0,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            float: DEFAULT_FLOAT_TOLERANCE,
            double: DEFAULT_DOUBLE_TOLERANCE,
            vector: DEFAULT_VECTOR_TOLERANCE,
        }
    }
}
