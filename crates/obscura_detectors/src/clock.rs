//! # Time Sources
//!
//! Every detector reads time through [`TickSource`]: ticks since an
//! unspecified epoch, monotonically non-decreasing for reliable sources.
//! One tick is one microsecond.

use crate::error::PlatformError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Ticks per second.
pub const TICKS_PER_SECOND: u64 = 1_000_000;

/// Ticks per millisecond.
pub const TICKS_PER_MILLI: u64 = 1_000;

/// A source of ticks.
pub trait TickSource: Send {
    /// Reads the current tick count.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the underlying clock cannot be read.
    fn ticks(&self) -> Result<u64, PlatformError>;
}

/// Reliable monotonic clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock at zero ticks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicClock {
    fn ticks(&self) -> Result<u64, PlatformError> {
        Ok(u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX))
    }
}

/// Device wall clock (microseconds since the Unix epoch).
///
/// This is the clock users and speed hacks can move.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TickSource for SystemClock {
    fn ticks(&self) -> Result<u64, PlatformError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| PlatformError::unavailable("SystemTime", e.to_string()))?;
        Ok(u64::try_from(since_epoch.as_micros()).unwrap_or(u64::MAX))
    }
}

/// Clock advanced explicitly by its owner.
///
/// Clones share the same counter. Hosts use it as a frame clock (advance by
/// the frame delta each frame); tests use it to script time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at `start` ticks.
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Sets the tick count.
    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }

    /// Advances by `delta` ticks.
    pub fn advance(&self, delta: u64) {
        self.ticks.fetch_add(delta, Ordering::SeqCst);
    }

    /// Advances by whole milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(millis * TICKS_PER_MILLI);
    }

    /// Current tick count.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl TickSource for ManualClock {
    fn ticks(&self) -> Result<u64, PlatformError> {
        Ok(self.now())
    }
}
