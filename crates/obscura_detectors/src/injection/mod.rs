//! # Injection Detection
//!
//! Periodically lists the libraries mapped into the process and flags any
//! that the build-time whitelist does not name. Each foreign library is
//! reported once per session.

mod enumerator;
mod whitelist;

pub use enumerator::{LibraryEnumerator, ProcMapsEnumerator, StaticEnumerator};
pub use whitelist::{normalize_library_name, InjectionWhitelist};

use crate::clock::{TickSource, TICKS_PER_MILLI};
use crate::detector::{Detector, DetectorState, Lifecycle, Phase};
use crate::error::{DetectorError, DetectorResult};
use crate::events::{DetectionEvent, DetectionKind, DetectionSink};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for the injection detector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Whether the detector runs at all.
    pub enabled: bool,
    /// Minimum reliable time between scans (milliseconds).
    pub interval_ms: u64,
    /// Quiet period after a detection (milliseconds).
    pub cool_down_ms: u64,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 10_000,
            cool_down_ms: 10_000,
        }
    }
}

impl InjectionConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] for a zero interval.
    pub fn validate(&self) -> DetectorResult<()> {
        if self.interval_ms == 0 {
            return Err(DetectorError::InvalidConfig(
                "injection.interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Injection detector.
pub struct InjectionDetector {
    config: InjectionConfig,
    whitelist: InjectionWhitelist,
    enumerator: Box<dyn LibraryEnumerator>,
    clock: Box<dyn TickSource>,
    sink: DetectionSink,
    life: Lifecycle,
    /// Libraries already reported this session.
    reported: HashSet<String>,
    last_scan: Option<u64>,
}

impl InjectionDetector {
    /// Detector name.
    pub const NAME: &'static str = "InjectionDetector";

    /// Creates a detector.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the configuration is
    /// invalid or the whitelist is empty.
    pub fn new(
        config: InjectionConfig,
        whitelist: InjectionWhitelist,
        enumerator: Box<dyn LibraryEnumerator>,
        clock: Box<dyn TickSource>,
        sink: DetectionSink,
    ) -> DetectorResult<Self> {
        config.validate()?;
        if whitelist.is_empty() {
            return Err(DetectorError::InvalidConfig(
                "injection whitelist is empty".to_string(),
            ));
        }
        let life = Lifecycle::new(
            Self::NAME,
            config.enabled,
            config.cool_down_ms.saturating_mul(TICKS_PER_MILLI),
        );
        Ok(Self {
            config,
            whitelist,
            enumerator,
            clock,
            sink,
            life,
            reported: HashSet::new(),
            last_scan: None,
        })
    }

    /// The whitelist in use.
    #[must_use]
    pub const fn whitelist(&self) -> &InjectionWhitelist {
        &self.whitelist
    }

    /// Libraries reported so far this session.
    #[must_use]
    pub fn reported(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.reported.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn scan(&mut self, now: u64) {
        if let Some(last) = self.last_scan {
            if now.saturating_sub(last) < self.config.interval_ms.saturating_mul(TICKS_PER_MILLI) {
                return;
            }
        }
        self.last_scan = Some(now);

        let libraries = match self.enumerator.loaded_libraries() {
            Ok(libraries) => libraries,
            Err(e) => {
                self.life.fail(&e);
                return;
            }
        };

        let mut foreign: Vec<String> = libraries
            .iter()
            .filter(|lib| !self.whitelist.contains(lib))
            .map(|lib| normalize_library_name(lib))
            .filter(|name| !self.reported.contains(name))
            .collect();
        foreign.sort_unstable();
        foreign.dedup();

        if foreign.is_empty() {
            return;
        }

        self.reported.extend(foreign.iter().cloned());
        self.life.trigger(now);
        self.sink.emit(DetectionEvent {
            kind: DetectionKind::Injection,
            detector: Self::NAME,
            at_ticks: now,
            description: format!("{} library(ies) not in whitelist", foreign.len()),
            details: foreign,
        });
    }
}

impl Detector for InjectionDetector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> DetectorState {
        self.life.state()
    }

    fn start(&mut self) {
        if self.life.start() {
            self.last_scan = None;
        }
    }

    fn stop(&mut self) {
        self.life.stop();
        self.reported.clear();
        self.last_scan = None;
    }

    fn tick(&mut self) {
        if !self.life.is_active() {
            return;
        }
        let now = match self.clock.ticks() {
            Ok(ticks) => ticks,
            Err(e) => {
                self.life.fail(&e);
                return;
            }
        };
        match self.life.advance(now) {
            Phase::Skip => {}
            Phase::Resume | Phase::Sample => self.scan(now),
        }
    }
}
