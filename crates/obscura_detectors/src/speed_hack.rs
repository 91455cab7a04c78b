//! # Speed-Hack Detection
//!
//! Speed hacks scale the timing functions a game reads. We sample two
//! independent clocks (a reliable one and the game's) and compare how much
//! each advanced since the last sample.
//!
//! ## Tie-Break
//!
//! A single noisy sample (frame hitch, OS suspend) must not flag a player:
//! only `max_false_positives` *consecutive* breaches trigger, and any passing
//! sample resets the count.

use crate::clock::{TickSource, TICKS_PER_MILLI};
use crate::detector::{Detector, DetectorState, Lifecycle, Phase};
use crate::error::{DetectorError, DetectorResult};
use crate::events::{DetectionEvent, DetectionKind, DetectionSink};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Configuration for the speed-hack detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedHackConfig {
    /// Whether the detector runs at all.
    pub enabled: bool,
    /// Minimum reliable time between samples (milliseconds).
    pub interval_ms: u64,
    /// Maximum tolerated drift ratio `|game - reliable| / reliable`.
    pub threshold: f64,
    /// Consecutive breaches required to trigger.
    pub max_false_positives: u32,
    /// Quiet period after a detection (milliseconds).
    pub cool_down_ms: u64,
    /// Number of recent samples kept for reports.
    pub window: usize,
}

impl Default for SpeedHackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1_000,
            threshold: 0.2, // 20% faster or slower
            max_false_positives: 3,
            cool_down_ms: 30_000,
            window: 16,
        }
    }
}

impl SpeedHackConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] for zero intervals, a
    /// non-positive threshold or a zero breach count.
    pub fn validate(&self) -> DetectorResult<()> {
        if self.interval_ms == 0 {
            return Err(DetectorError::InvalidConfig(
                "speed_hack.interval_ms must be positive".to_string(),
            ));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(DetectorError::InvalidConfig(format!(
                "speed_hack.threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        if self.max_false_positives == 0 {
            return Err(DetectorError::InvalidConfig(
                "speed_hack.max_false_positives must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One drift measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftSample {
    /// Reliable ticks when the sample was taken.
    pub at_ticks: u64,
    /// Reliable ticks elapsed since the previous sample.
    pub reliable_elapsed: u64,
    /// Game ticks elapsed since the previous sample.
    pub game_elapsed: u64,
    /// Drift ratio.
    pub drift: f64,
}

/// Speed-hack detector.
pub struct SpeedHackDetector {
    config: SpeedHackConfig,
    reliable: Box<dyn TickSource>,
    game: Box<dyn TickSource>,
    sink: DetectionSink,
    life: Lifecycle,
    /// `(reliable, game)` ticks at the previous sample.
    baseline: Option<(u64, u64)>,
    /// Consecutive out-of-threshold samples.
    breaches: u32,
    samples: VecDeque<DriftSample>,
    detections: u32,
}

impl SpeedHackDetector {
    /// Detector name.
    pub const NAME: &'static str = "SpeedHackDetector";

    /// Creates a detector.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidConfig`] if the configuration is invalid.
    pub fn new(
        config: SpeedHackConfig,
        reliable: Box<dyn TickSource>,
        game: Box<dyn TickSource>,
        sink: DetectionSink,
    ) -> DetectorResult<Self> {
        config.validate()?;
        let life = Lifecycle::new(
            Self::NAME,
            config.enabled,
            config.cool_down_ms.saturating_mul(TICKS_PER_MILLI),
        );
        Ok(Self {
            samples: VecDeque::with_capacity(config.window),
            config,
            reliable,
            game,
            sink,
            life,
            baseline: None,
            breaches: 0,
            detections: 0,
        })
    }

    /// Recent drift samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> &VecDeque<DriftSample> {
        &self.samples
    }

    /// Current consecutive breach count.
    #[must_use]
    pub const fn breaches(&self) -> u32 {
        self.breaches
    }

    /// Number of detections raised since construction.
    #[must_use]
    pub const fn detections(&self) -> u32 {
        self.detections
    }

    fn reset_session(&mut self) {
        self.baseline = None;
        self.breaches = 0;
    }

    fn sample(&mut self, now: u64) {
        let game_now = match self.game.ticks() {
            Ok(ticks) => ticks,
            Err(e) => {
                self.life.fail(&e);
                return;
            }
        };

        let Some((last_reliable, last_game)) = self.baseline else {
            self.baseline = Some((now, game_now));
            return;
        };

        let reliable_elapsed = now.saturating_sub(last_reliable);
        if reliable_elapsed < self.config.interval_ms.saturating_mul(TICKS_PER_MILLI) {
            return;
        }

        let game_elapsed = game_now.saturating_sub(last_game);
        let drift = calculate_drift(reliable_elapsed, game_elapsed);
        self.baseline = Some((now, game_now));
        self.record(DriftSample {
            at_ticks: now,
            reliable_elapsed,
            game_elapsed,
            drift,
        });

        if drift > self.config.threshold {
            self.breaches += 1;
            tracing::debug!(
                "Speed drift {:.3} over threshold {:.3} ({}/{})",
                drift,
                self.config.threshold,
                self.breaches,
                self.config.max_false_positives
            );
            if self.breaches >= self.config.max_false_positives {
                self.raise(now, drift);
            }
        } else {
            self.breaches = 0;
        }
    }

    fn record(&mut self, sample: DriftSample) {
        if self.config.window == 0 {
            return;
        }
        if self.samples.len() == self.config.window {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn raise(&mut self, now: u64, drift: f64) {
        self.detections += 1;
        self.breaches = 0;
        self.life.trigger(now);
        self.sink.emit(DetectionEvent {
            kind: DetectionKind::SpeedHack,
            detector: Self::NAME,
            at_ticks: now,
            description: format!(
                "Game clock drifted {:.1}% from reliable clock for {} consecutive samples",
                drift * 100.0,
                self.config.max_false_positives
            ),
            details: self
                .samples
                .iter()
                .map(|s| {
                    format!(
                        "reliable={} game={} drift={:.3}",
                        s.reliable_elapsed, s.game_elapsed, s.drift
                    )
                })
                .collect(),
        });
    }
}

impl Detector for SpeedHackDetector {
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
        self.samples.clear();
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
            Phase::Resume => {
                self.reset_session();
                self.sample(now);
            }
            Phase::Sample => self.sample(now),
        }
    }
}

/// Relative difference between two elapsed spans.
#[allow(clippy::cast_precision_loss)]
fn calculate_drift(reliable_elapsed: u64, game_elapsed: u64) -> f64 {
    if reliable_elapsed == 0 {
        return 0.0;
    }
    (game_elapsed as f64 - reliable_elapsed as f64).abs() / reliable_elapsed as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::PlatformError;
    use crate::events::DetectionBus;

    struct BrokenClock;

    impl TickSource for BrokenClock {
        fn ticks(&self) -> Result<u64, PlatformError> {
            Err(PlatformError::unavailable("test", "no clock"))
        }
    }

    struct Rig {
        reliable: ManualClock,
        game: ManualClock,
        bus: DetectionBus,
        detector: SpeedHackDetector,
    }

    fn rig() -> Rig {
        let reliable = ManualClock::new(0);
        let game = ManualClock::new(0);
        let bus = DetectionBus::new();
        let config = SpeedHackConfig {
            interval_ms: 1_000,
            threshold: 0.2,
            max_false_positives: 3,
            cool_down_ms: 10_000,
            ..SpeedHackConfig::default()
        };
        let mut detector = SpeedHackDetector::new(
            config,
            Box::new(reliable.clone()),
            Box::new(game.clone()),
            bus.sink(),
        )
        .unwrap();
        detector.start();
        detector.tick(); // baseline
        Rig { reliable, game, bus, detector }
    }

    impl Rig {
        /// One sampling interval with the game clock running at `speed`.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        fn step(&mut self, speed: f64) {
            self.reliable.advance_millis(1_000);
            self.game.advance_millis((1_000.0 * speed) as u64);
            self.detector.tick();
        }
    }

    #[test]
    fn test_normal_speed_never_triggers() {
        let mut rig = rig();
        for _ in 0..20 {
            rig.step(1.05);
        }
        assert_eq!(rig.detector.detections(), 0);
        assert_eq!(rig.bus.pending(), 0);
        assert_eq!(rig.detector.samples().len(), 16);
    }

    #[test]
    fn test_single_breach_then_pass_resets_counter() {
        let mut rig = rig();
        rig.step(2.0);
        assert_eq!(rig.detector.breaches(), 1);
        rig.step(1.0);
        assert_eq!(rig.detector.breaches(), 0);
        rig.step(2.0);
        rig.step(2.0);
        rig.step(1.0);
        assert_eq!(rig.detector.detections(), 0);
    }

    #[test]
    fn test_consecutive_breaches_trigger_then_cool_down() {
        let mut rig = rig();
        rig.step(2.0);
        rig.step(2.0);
        assert_eq!(rig.detector.detections(), 0);
        rig.step(2.0);
        assert_eq!(rig.detector.detections(), 1);
        assert_eq!(rig.detector.state(), DetectorState::Triggered);

        let events = rig.bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DetectionKind::SpeedHack);

        // Still cheating, but inside the 10s cool-down.
        for _ in 0..9 {
            rig.step(2.0);
        }
        assert_eq!(rig.detector.state(), DetectorState::Cooldown);
        assert_eq!(rig.detector.detections(), 1);

        // Cool-down over: fresh baseline, then three more breaches.
        rig.step(2.0);
        assert_eq!(rig.detector.state(), DetectorState::Sampling);
        rig.step(2.0);
        rig.step(2.0);
        rig.step(2.0);
        assert_eq!(rig.detector.detections(), 2);
    }

    #[test]
    fn test_slow_motion_is_drift_too() {
        let mut rig = rig();
        for _ in 0..3 {
            rig.step(0.5);
        }
        assert_eq!(rig.detector.detections(), 1);
    }

    #[test]
    fn test_samples_wait_for_interval() {
        let mut rig = rig();
        rig.reliable.advance_millis(500);
        rig.game.advance_millis(5_000);
        rig.detector.tick();
        assert!(rig.detector.samples().is_empty());
    }

    #[test]
    fn test_clock_failure_disables_detector() {
        let bus = DetectionBus::new();
        let mut detector = SpeedHackDetector::new(
            SpeedHackConfig::default(),
            Box::new(ManualClock::new(0)),
            Box::new(BrokenClock),
            bus.sink(),
        )
        .unwrap();
        detector.start();
        detector.tick();
        assert_eq!(detector.state(), DetectorState::Unavailable);
        detector.tick();
        assert_eq!(detector.state(), DetectorState::Unavailable);
        assert!(!detector.is_running());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = SpeedHackConfig {
            max_false_positives: 0,
            ..SpeedHackConfig::default()
        };
        let result = SpeedHackDetector::new(
            config,
            Box::new(ManualClock::new(0)),
            Box::new(ManualClock::new(0)),
            DetectionBus::new().sink(),
        );
        assert!(matches!(result, Err(DetectorError::InvalidConfig(_))));
    }

    #[test]
    fn test_disabled_detector_stays_idle() {
        let config = SpeedHackConfig {
            enabled: false,
            ..SpeedHackConfig::default()
        };
        let mut detector = SpeedHackDetector::new(
            config,
            Box::new(ManualClock::new(0)),
            Box::new(ManualClock::new(0)),
            DetectionBus::new().sink(),
        )
        .unwrap();
        detector.start();
        detector.tick();
        assert_eq!(detector.state(), DetectorState::Idle);
    }
}
