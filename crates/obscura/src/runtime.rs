//! # Anti-Cheat Runtime
//!
//! Owns every detector, the detection bus and the preference store.
//!
//! ```text
//!   host frame loop
//!        │
//!        ▼
//!   runtime.tick() ──► SpeedHack ─┐
//!                  ──► TimeCheat ─┼──► DetectionBus ──► Vec<DetectionEvent>
//!                  ──► Injection ─┤
//!   runtime.inspect(v) ► Obscured ┘
//!
//!   runtime.load() / save() ──► PrefsStore ──► backend
//! ```

use crate::config::ObscuraConfig;
use crate::error::ObscuraResult;
use obscura_core::DataIntegrity;
use obscura_detectors::{
    DetectionBus, DetectionEvent, Detector, DetectorState, InjectionDetector, InjectionWhitelist,
    LibraryEnumerator, MonotonicClock, ObscuredCheatingDetector, ProcMapsEnumerator,
    SpeedHackDetector, SystemClock, TickSource, TimeCheatDetector,
};
use obscura_prefs::{FileBackend, PrefsBackend, PrefsStore, StoreKey};

/// Platform services the runtime reads.
pub struct HostServices {
    /// Clock speed hacks cannot scale. Sampled by every detector.
    pub reliable: Box<dyn Fn() -> Box<dyn TickSource>>,
    /// Clock the game simulation runs on.
    pub game: Box<dyn TickSource>,
    /// Device wall clock.
    pub wall: Box<dyn TickSource>,
    /// Loaded-library listing.
    pub enumerator: Box<dyn LibraryEnumerator>,
    /// Libraries the build shipped with.
    pub whitelist: InjectionWhitelist,
    /// Where preferences are persisted.
    pub backend: Box<dyn PrefsBackend>,
}

impl HostServices {
    /// Services backed by the operating system.
    ///
    /// `game` is the clock the simulation reads, so a speed hack scaling it
    /// shows up as drift against [`MonotonicClock`].
    #[must_use]
    pub fn native(game: Box<dyn TickSource>, whitelist: InjectionWhitelist, config: &ObscuraConfig) -> Self {
        let reliable = MonotonicClock::new();
        Self {
            reliable: Box::new(move || -> Box<dyn TickSource> { Box::new(reliable) }),
            game,
            wall: Box::new(SystemClock),
            enumerator: Box::new(ProcMapsEnumerator::default()),
            whitelist,
            backend: Box::new(FileBackend::new(config.prefs.file.clone())),
        }
    }
}

/// Detectors and preferences behind the host lifecycle.
pub struct AntiCheatRuntime {
    detectors: Vec<Box<dyn Detector>>,
    obscured: ObscuredCheatingDetector,
    bus: DetectionBus,
    prefs: PrefsStore,
}

impl AntiCheatRuntime {
    /// Builds every enabled detector and an empty store.
    ///
    /// # Errors
    ///
    /// Returns the detector error for an invalid configuration or an empty
    /// whitelist while injection detection is enabled.
    pub fn new(config: &ObscuraConfig, key: StoreKey, host: HostServices) -> ObscuraResult<Self> {
        config.validate()?;
        let settings = &config.detectors;
        let bus = DetectionBus::new();

        let mut detectors: Vec<Box<dyn Detector>> = Vec::with_capacity(3);
        detectors.push(Box::new(SpeedHackDetector::new(
            settings.speed_hack.clone(),
            (host.reliable)(),
            host.game,
            bus.sink(),
        )?));
        detectors.push(Box::new(TimeCheatDetector::new(
            settings.time_cheat.clone(),
            host.wall,
            (host.reliable)(),
            bus.sink(),
        )?));
        if settings.injection.enabled {
            detectors.push(Box::new(InjectionDetector::new(
                settings.injection.clone(),
                host.whitelist,
                host.enumerator,
                (host.reliable)(),
                bus.sink(),
            )?));
        }

        let obscured = ObscuredCheatingDetector::new(
            settings.obscured_cheating.clone(),
            (host.reliable)(),
            bus.sink(),
        );
        let prefs = PrefsStore::new(key, &config.prefs.serialization, host.backend);

        tracing::info!(
            "Anti-cheat runtime ready: {} polled detectors, prefs as {:?}",
            detectors.len(),
            prefs.kind()
        );

        Ok(Self {
            detectors,
            obscured,
            bus,
            prefs,
        })
    }

    /// Starts every detector.
    pub fn start(&mut self) {
        for detector in &mut self.detectors {
            detector.start();
        }
        self.obscured.start();
    }

    /// Stops every detector.
    pub fn stop(&mut self) {
        for detector in &mut self.detectors {
            detector.stop();
        }
        self.obscured.stop();
    }

    /// Advances every detector and returns the detections raised since the
    /// previous call.
    pub fn tick(&mut self) -> Vec<DetectionEvent> {
        for detector in &mut self.detectors {
            detector.tick();
        }
        self.obscured.tick();
        self.bus.drain()
    }

    /// Checks an obscured value's sentinel. The event, if any, is returned by
    /// the next [`tick`](Self::tick).
    pub fn inspect<V: DataIntegrity + ?Sized>(&mut self, label: &str, value: &V) -> bool {
        self.obscured.inspect(label, value)
    }

    /// Loads saved preferences. Returns false if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns the prefs error for a corrupt blob or an I/O failure.
    pub fn load(&self) -> ObscuraResult<bool> {
        Ok(self.prefs.load_or_default()?)
    }

    /// Saves preferences. Returns the blob size.
    ///
    /// # Errors
    ///
    /// Returns the prefs error on I/O failure.
    pub fn save(&self) -> ObscuraResult<usize> {
        Ok(self.prefs.save()?)
    }

    /// The preference store.
    #[must_use]
    pub const fn prefs(&self) -> &PrefsStore {
        &self.prefs
    }

    /// Name and state of every detector.
    #[must_use]
    pub fn detector_states(&self) -> Vec<(&'static str, DetectorState)> {
        self.detectors
            .iter()
            .map(|d| (d.name(), d.state()))
            .chain(std::iter::once((self.obscured.name(), self.obscured.state())))
            .collect()
    }
}
