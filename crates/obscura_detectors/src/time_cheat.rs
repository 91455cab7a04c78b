//! # Time-Cheat Detection
//!
//! Moving the device clock forward skips timers (energy refills, daily
//! rewards). The offset between the wall clock and the monotonic clock is
//! constant while nobody touches the clock, so we snapshot it at start and
//! watch it drift.
//!
//! Two thresholds:
//! - `wrong_time_threshold_ms`: the clock moved, maybe NTP, maybe a user
//! - `cheat_threshold_ms`: the clock moved far enough to call it cheating
//!
//! The session-start offset stays the baseline for the whole session. After
//! a detection the reported offset is remembered, and only a further move
//! past the wrong-time threshold (or a return to the honest offset followed
//! by a new move) raises again.

use crate::clock::{TickSource, TICKS_PER_MILLI};
use crate::detector::{Detector, DetectorState, Lifecycle, Phase};
use crate::error::{DetectorError, DetectorResult};
use crate::events::{DetectionEvent, DetectionKind, DetectionSink};
use serde::{Deserialize, Serialize};

/// Configuration for the time-cheat detector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeCheatConfig {
    /// Whether the detector runs at all.
    pub enabled: bool,
    /// Minimum reliable time between checks (milliseconds).
    pub interval_ms: u64,
    /// Drift reported as wrong device time (milliseconds).
    pub wrong_time_threshold_ms: u64,
    /// Drift reported as cheating (milliseconds).
    pub cheat_threshold_ms: u64,
    /// Quiet period after a detection (milliseconds).
    pub cool_down_ms: u64,
}

impl Default for TimeCheatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5_000,
            wrong_time_threshold_ms: 60_000,  // 1 minute
            cheat_threshold_ms: 600_000,      // 10 minutes
            cool_down_ms: 60_000,
        }
    }
}

impl TimeCheatConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] for a zero interval or
    /// thresholds out of order.
    pub fn validate(&self) -> DetectorResult<()> {
        if self.interval_ms == 0 {
            return Err(DetectorError::InvalidConfig(
                "time_cheat.interval_ms must be positive".to_string(),
            ));
        }
        if self.wrong_time_threshold_ms == 0 || self.cheat_threshold_ms < self.wrong_time_threshold_ms {
            return Err(DetectorError::InvalidConfig(format!(
                "time_cheat thresholds must satisfy 0 < wrong_time ({}) <= cheat ({})",
                self.wrong_time_threshold_ms, self.cheat_threshold_ms
            )));
        }
        Ok(())
    }
}

/// Time-cheat detector.
pub struct TimeCheatDetector {
    config: TimeCheatConfig,
    wall: Box<dyn TickSource>,
    reliable: Box<dyn TickSource>,
    sink: DetectionSink,
    life: Lifecycle,
    /// `wall - reliable` when the session started.
    baseline_offset: Option<i128>,
    /// Offset at the last detection, until the clock is put back.
    reported_offset: Option<i128>,
    last_check: u64,
    last_drift_ms: u64,
    detections: u32,
}

impl TimeCheatDetector {
    /// Detector name.
    pub const NAME: &'static str = "TimeCheatDetector";

    /// Creates a detector.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the configuration is invalid.
    pub fn new(
        config: TimeCheatConfig,
        wall: Box<dyn TickSource>,
        reliable: Box<dyn TickSource>,
        sink: DetectionSink,
    ) -> DetectorResult<Self> {
        config.validate()?;
        let life = Lifecycle::new(
            Self::NAME,
            config.enabled,
            config.cool_down_ms.saturating_mul(TICKS_PER_MILLI),
        );
        Ok(Self {
            config,
            wall,
            reliable,
            sink,
            life,
            baseline_offset: None,
            reported_offset: None,
            last_check: 0,
            last_drift_ms: 0,
            detections: 0,
        })
    }

    /// Drift measured by the last check (milliseconds).
    #[must_use]
    pub const fn last_drift_ms(&self) -> u64 {
        self.last_drift_ms
    }

    /// Number of detections raised since construction.
    #[must_use]
    pub const fn detections(&self) -> u32 {
        self.detections
    }

    fn reset_session(&mut self) {
        self.baseline_offset = None;
        self.reported_offset = None;
    }

    fn check(&mut self, now: u64) {
        let wall_now = match self.wall.ticks() {
            Ok(ticks) => ticks,
            Err(e) => {
                self.life.fail(&e);
                return;
            }
        };
        let offset = i128::from(wall_now) - i128::from(now);

        let Some(baseline) = self.baseline_offset else {
            self.baseline_offset = Some(offset);
            self.last_check = now;
            return;
        };

        if now.saturating_sub(self.last_check) < self.config.interval_ms.saturating_mul(TICKS_PER_MILLI) {
            return;
        }
        self.last_check = now;

        let drift_ticks = (offset - baseline).unsigned_abs();
        let drift_ms = u64::try_from(drift_ticks / u128::from(TICKS_PER_MILLI)).unwrap_or(u64::MAX);
        self.last_drift_ms = drift_ms;

        let kind = if drift_ms > self.config.cheat_threshold_ms {
            DetectionKind::TimeCheat
        } else if drift_ms > self.config.wrong_time_threshold_ms {
            DetectionKind::WrongTime
        } else {
            self.reported_offset = None;
            return;
        };

        if let Some(reported) = self.reported_offset {
            let moved_ms = (offset - reported).unsigned_abs() / u128::from(TICKS_PER_MILLI);
            if moved_ms <= u128::from(self.config.wrong_time_threshold_ms) {
                return;
            }
        }
        self.reported_offset = Some(offset);

        self.detections += 1;
        self.life.trigger(now);
        let direction = if offset > baseline { "forward" } else { "backward" };
        self.sink.emit(DetectionEvent {
            kind,
            detector: Self::NAME,
            at_ticks: now,
            description: format!("Device clock moved {direction} by {drift_ms} ms during the session"),
            details: vec![
                format!("baseline_offset={baseline}"),
                format!("current_offset={offset}"),
            ],
        });
    }
}

impl Detector for TimeCheatDetector {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn state(&self) -> DetectorState {
        self.life.state()
    }

    fn start(&mut self) {
        if self.life.start() {
            self.reset_session();
        }
    }

    fn stop(&mut self) {
        self.life.stop();
        self.reset_session();
    }

    fn tick(&mut self) {
        if !self.life.is_active() {
            return;
        }
        let now = match self.reliable.ticks() {
            Ok(ticks) => ticks,
            Err(e) => {
                self.life.fail(&e);
                return;
            }
        };
        match self.life.advance(now) {
            Phase::Skip => {}
            Phase::Resume | Phase::Sample => self.check(now),
        }
    }
}
