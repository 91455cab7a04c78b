//! # Obscured-Value Tampering
//!
//! Turns fake-value sentinel mismatches into detection events. Hosts hand
//! their obscured values to [`ObscuredCheatingDetector::inspect`] wherever
//! they read them. Each label is reported once per session.

use crate::clock::TickSource;
use crate::detector::{Detector, DetectorState, Lifecycle};
use crate::events::{DetectionEvent, DetectionKind, DetectionSink};
use obscura_core::{DataIntegrity, Tolerances};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration for the obscured-cheating detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObscuredCheatingConfig {
    /// Whether inspections run at all.
    pub enabled: bool,
    /// Tolerances for float and vector comparisons.
    pub tolerances: Tolerances,
}

impl Default for ObscuredCheatingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerances: Tolerances::default(),
        }
    }
}

/// Obscured-cheating detector.
pub struct ObscuredCheatingDetector {
    config: ObscuredCheatingConfig,
    clock: Box<dyn TickSource>,
    sink: DetectionSink,
    life: Lifecycle,
    /// Labels already reported this session.
    reported: BTreeSet<String>,
    detections: u32,
}

impl ObscuredCheatingDetector {
    /// Detector name.
    pub const NAME: &'static str = "ObscuredCheatingDetector";

    /// Creates a detector. `clock` only stamps events.
    #[must_use]
    pub fn new(config: ObscuredCheatingConfig, clock: Box<dyn TickSource>, sink: DetectionSink) -> Self {
        let life = Lifecycle::new(Self::NAME, config.enabled, 0);
        Self {
            config,
            clock,
            sink,
            life,
            reported: BTreeSet::new(),
            detections: 0,
        }
    }

    /// Labels reported since the last start, sorted.
    #[must_use]
    pub fn reported(&self) -> Vec<&str> {
        self.reported.iter().map(String::as_str).collect()
    }

    /// Number of mismatches reported.
    #[must_use]
    pub const fn detections(&self) -> u32 {
        self.detections
    }

    /// Checks `value`, emitting an event on mismatch.
    ///
    /// Returns true if the value passed (or the detector is not running).
    /// A label already reported still returns false but raises nothing.
    pub fn inspect<V: DataIntegrity + ?Sized>(&mut self, label: &str, value: &V) -> bool {
        if !self.life.is_active() {
            return true;
        }
        if value.is_data_valid_within(&self.config.tolerances) {
            return true;
        }
        if !self.reported.insert(label.to_string()) {
            return false;
        }

        let clock = self.clock.ticks();
        let now = clock.as_ref().ok().copied().unwrap_or(0);
        self.detections += 1;
        self.life.trigger(now);
        self.sink.emit(DetectionEvent {
            kind: DetectionKind::ObscuredTampering,
            detector: Self::NAME,
            at_ticks: now,
            description: format!("Decode mismatch on obscured {} '{label}'", value.type_name()),
            details: vec![format!("label={label}"), format!("type={}", value.type_name())],
        });
        if let Err(e) = clock {
            self.life.fail(&e);
        }
        false
    }
}

impl Detector for ObscuredCheatingDetector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> DetectorState {
        self.life.state()
    }

    fn start(&mut self) {
        if self.life.start() {
            self.reported.clear();
        }
    }

    fn stop(&mut self) {
        self.life.stop();
        self.reported.clear();
    }

    fn tick(&mut self) {
        if !self.life.is_active() {
            return;
        }
        // Zero cool-down: Triggered falls back to Sampling on the next tick.
        match self.clock.ticks() {
            Ok(now) => {
                self.life.advance(now);
            }
            Err(e) => self.life.fail(&e),
        }
    }
}
