//! # OBSCURA - Anti-Tamper Runtime
//!
//! Facade over the OBSCURA crates for a host game engine.
//!
//! ## Crates
//!
//! - [`obscura_core`]: obscured values and the fake-value sentinel
//! - [`obscura_detectors`]: speed-hack, time-cheat, injection and tampering detectors
//! - [`obscura_prefs`]: encrypted preference store
//!
//! ## Host Lifecycle
//!
//! ```text
//!   ObscuraConfig::from_file ──► AntiCheatRuntime::new ──► start()
//!                                                            │
//!               ┌──────────── every frame ──────────────────┤
//!               ▼                                            │
//!            tick() ──► Vec<DetectionEvent>                  │
//!                                                            │
//!   load() at boot, save() on pause/quit ◄───────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod runtime;

pub use config::ObscuraConfig;
pub use error::{ObscuraError, ObscuraResult};
pub use runtime::{AntiCheatRuntime, HostServices};

pub use obscura_core;
pub use obscura_detectors;
pub use obscura_prefs;
