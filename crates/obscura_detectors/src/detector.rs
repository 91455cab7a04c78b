//! # Detector Lifecycle
//!
//! Shared state machine for polled detectors.

use crate::error::PlatformError;

/// Detector state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorState {
    /// Not started, or stopped.
    #[default]
    Idle,
    /// Taking samples.
    Sampling,
    /// Detection raised on the last tick.
    Triggered,
    /// Waiting out the cool-down after a detection.
    Cooldown,
    /// A platform API failed; the detector is off until restarted.
    Unavailable,
}

/// A polled detector.
pub trait Detector: Send {
    /// Detector name used in events and logs.
    fn name(&self) -> &'static str;

    /// Current state.
    fn state(&self) -> DetectorState;

    /// Starts sampling. Disabled detectors stay idle.
    fn start(&mut self);

    /// Stops sampling and clears per-session state.
    fn stop(&mut self);

    /// Advances the detector. Safe to call at any cadence.
    fn tick(&mut self);

    /// Returns true while the detector is started and healthy.
    fn is_running(&self) -> bool {
        matches!(
            self.state(),
            DetectorState::Sampling | DetectorState::Triggered | DetectorState::Cooldown
        )
    }
}

/// What a detector should do on this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Nothing to do.
    Skip,
    /// Cool-down just ended: reset baselines, then sample.
    Resume,
    /// Sample normally.
    Sample,
}

/// Bookkeeping shared by every detector.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    name: &'static str,
    enabled: bool,
    state: DetectorState,
    cool_down: u64,
    cooldown_until: u64,
    failure_logged: bool,
}

impl Lifecycle {
    pub(crate) const fn new(name: &'static str, enabled: bool, cool_down: u64) -> Self {
        Self {
            name,
            enabled,
            state: DetectorState::Idle,
            cool_down,
            cooldown_until: 0,
            failure_logged: false,
        }
    }

    pub(crate) const fn state(&self) -> DetectorState {
        self.state
    }

    /// True when the detector wants its clocks read this tick.
    pub(crate) const fn is_active(&self) -> bool {
        !matches!(self.state, DetectorState::Idle | DetectorState::Unavailable)
    }

    /// Returns true if sampling actually started.
    pub(crate) fn start(&mut self) -> bool {
        if !self.enabled {
            tracing::info!("{} disabled by configuration", self.name);
            return false;
        }
        if self.is_active() {
            return false;
        }
        tracing::info!("{} started", self.name);
        self.state = DetectorState::Sampling;
        self.failure_logged = false;
        true
    }

    pub(crate) fn stop(&mut self) {
        if self.state != DetectorState::Idle {
            tracing::info!("{} stopped", self.name);
        }
        self.state = DetectorState::Idle;
        self.cooldown_until = 0;
    }

    /// Disables the detector after a platform failure, logging once.
    pub(crate) fn fail(&mut self, error: &PlatformError) {
        if !self.failure_logged {
            tracing::warn!("{} unable to determine, detector disabled: {}", self.name, error);
            self.failure_logged = true;
        }
        self.state = DetectorState::Unavailable;
    }

    /// Records a detection at `now` and schedules the cool-down.
    pub(crate) fn trigger(&mut self, now: u64) {
        self.state = DetectorState::Triggered;
        self.cooldown_until = now.saturating_add(self.cool_down);
    }

    /// Moves through Triggered and Cooldown.
    pub(crate) fn advance(&mut self, now: u64) -> Phase {
        if self.state == DetectorState::Triggered {
            self.state = DetectorState::Cooldown;
        }
        match self.state {
            DetectorState::Sampling => Phase::Sample,
            DetectorState::Cooldown if now >= self.cooldown_until => {
                self.state = DetectorState::Sampling;
                Phase::Resume
            }
            _ => Phase::Skip,
        }
    }
}
