//! # Key Generation
//!
//! Crypto keys come from a thread-local ChaCha8 stream seeded from OS
//! entropy. The threat model is generic value search in a memory scanner,
//! not a dedicated reverse engineer, so a fast seeded stream is enough.

use crate::codec::ObscureCodec;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;

thread_local! {
    static KEY_RNG: RefCell<ChaCha8Rng> = RefCell::new(ChaCha8Rng::from_entropy());
}

/// Generates a fresh key for `T`.
#[must_use]
pub fn generate<T: ObscureCodec>() -> T::Key {
    KEY_RNG.with(|rng| T::generate_key(&mut *rng.borrow_mut()))
}

/// Returns 32 random bits from the key stream.
#[must_use]
pub fn random_u32() -> u32 {
    KEY_RNG.with(|rng| rng.borrow_mut().next_u32())
}

/// Reseeds the calling thread's key stream.
///
/// Makes key generation reproducible. Meant for tests and replays.
pub fn reseed(seed: u64) {
    KEY_RNG.with(|rng| *rng.borrow_mut() = ChaCha8Rng::seed_from_u64(seed));
}
