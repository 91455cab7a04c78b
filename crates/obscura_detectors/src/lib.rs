//! # OBSCURA Detectors - The Watchmen
//!
//! Client-side cheat detectors driven by the host's frame loop.
//!
//! ## Detectors
//!
//! - **Speed hack**: a game clock running faster than the reliable clock
//! - **Time cheat**: the wall clock moved against the monotonic clock
//! - **Injection**: a loaded library missing from the build-time whitelist
//! - **Obscured cheating**: an obscured value whose decoy no longer matches
//!
//! ## State Machine
//!
//! ```text
//!            start()            breach x N            cool_down elapsed
//!   Idle ─────────────► Sampling ──────────► Triggered ──► Cooldown ──┐
//!     ▲                    ▲                                          │
//!     │ stop()             └──────────────────────────────────────────┘
//!     │
//!   (any) ── platform API error ──► Unavailable (logged once)
//! ```
//!
//! Detections are published on a [`DetectionBus`] and never block the
//! polling path.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod detector;
pub mod error;
pub mod events;
pub mod injection;
pub mod obscured_cheating;
pub mod settings;
pub mod speed_hack;
pub mod time_cheat;

pub use clock::{ManualClock, MonotonicClock, SystemClock, TickSource, TICKS_PER_MILLI, TICKS_PER_SECOND};
pub use detector::{Detector, DetectorState};
pub use error::{DetectorError, DetectorResult, PlatformError};
pub use events::{DetectionBus, DetectionEvent, DetectionKind, DetectionSink};
pub use injection::{
    InjectionConfig, InjectionDetector, InjectionWhitelist, LibraryEnumerator,
    ProcMapsEnumerator, StaticEnumerator,
};
pub use obscured_cheating::{ObscuredCheatingConfig, ObscuredCheatingDetector};
pub use settings::DetectorSettings;
pub use speed_hack::{DriftSample, SpeedHackConfig, SpeedHackDetector};
pub use time_cheat::{TimeCheatConfig, TimeCheatDetector};
