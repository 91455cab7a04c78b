//! # OBSCURA Core - Obscured Values
//!
//! In-memory value obfuscation for game state that memory scanners love to
//! find: health, currency, score, timers.
//!
//! ## Features
//!
//! - **Codec**: XOR on raw bit patterns with a per-instance random key
//! - **Sentinel**: a decoy plaintext copy that exposes out-of-band writes
//! - **Obscured types**: `ObscuredInt`, `ObscuredDouble`, `ObscuredVector2`...
//!
//! ## Architecture
//!
//! ```text
//!   set_value(v) ───────────────┬──────────────► fake = v
//!                               │
//!                               ▼
//!                      ┌─────────────────┐
//!                      │ encrypt(v, key) │──► encrypted
//!                      └─────────────────┘
//!
//!   value() ◄──── decrypt(encrypted, key)
//!
//!   is_data_valid() ── decrypt(encrypted, key) == fake ?
//! ```
//!
//! ## Example
//!
//! ```rust
//! use obscura_core::{DataIntegrity, ObscuredInt};
//!
//! let mut gold = ObscuredInt::new(100);
//! gold += 25;
//! assert_eq!(gold.value(), 125);
//! assert!(gold.is_data_valid());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod codec;
pub mod keys;
pub mod math;
pub mod obscured;
pub mod raw;
pub mod sentinel;
pub mod tolerance;

pub use codec::ObscureCodec;
pub use math::{Vector2, Vector3};
pub use obscured::{
    Obscured, ObscuredBool, ObscuredDouble, ObscuredFloat, ObscuredInt, ObscuredLong,
    ObscuredUInt, ObscuredULong, ObscuredVector2, ObscuredVector3,
};
pub use raw::{RawEncryptedVector2, RawEncryptedVector3};
pub use sentinel::DataIntegrity;
pub use tolerance::Tolerances;
