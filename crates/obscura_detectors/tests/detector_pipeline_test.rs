//! Integration test: every detector publishing on one bus.

use obscura_core::{DataIntegrity, ObscuredInt, Tolerances};
use obscura_detectors::{
    DetectionBus, DetectionKind, Detector, DetectorSettings, DetectorState, InjectionDetector,
    InjectionWhitelist, ManualClock, ObscuredCheatingDetector, SpeedHackDetector, StaticEnumerator,
    TimeCheatDetector,
};

const FRAME_MS: u64 = 250;

struct Rig {
    reliable: ManualClock,
    game: ManualClock,
    wall: ManualClock,
    libraries: StaticEnumerator,
    bus: DetectionBus,
    detectors: Vec<Box<dyn Detector>>,
}

impl Rig {
    fn new(settings: &DetectorSettings) -> Self {
        let reliable = ManualClock::new(0);
        let game = ManualClock::new(0);
        let wall = ManualClock::new(1_700_000_000_000_000);
        let libraries = StaticEnumerator::new(["/usr/lib/libc.so.6", "/opt/game/libgame.so"]);
        let bus = DetectionBus::new();

        let mut detectors: Vec<Box<dyn Detector>> = Vec::new();
        detectors.push(Box::new(
            SpeedHackDetector::new(
                settings.speed_hack.clone(),
                Box::new(reliable.clone()),
                Box::new(game.clone()),
                bus.sink(),
            )
            .unwrap(),
        ));
        detectors.push(Box::new(
            TimeCheatDetector::new(
                settings.time_cheat.clone(),
                Box::new(wall.clone()),
                Box::new(reliable.clone()),
                bus.sink(),
            )
            .unwrap(),
        ));
        detectors.push(Box::new(
            InjectionDetector::new(
                settings.injection.clone(),
                InjectionWhitelist::from_manifest("libc.so.6\nlibgame.so\n").unwrap(),
                Box::new(libraries.clone()),
                Box::new(reliable.clone()),
                bus.sink(),
            )
            .unwrap(),
        ));

        Self {
            reliable,
            game,
            wall,
            libraries,
            bus,
            detectors,
        }
    }

    fn start(&mut self) {
        for detector in &mut self.detectors {
            detector.start();
        }
    }

    /// One frame: the game clock runs `speed` times the reliable clock.
    fn frame(&mut self, speed: u64) {
        self.reliable.advance_millis(FRAME_MS);
        self.wall.advance_millis(FRAME_MS);
        self.game.advance_millis(FRAME_MS * speed);
        for detector in &mut self.detectors {
            detector.tick();
        }
    }
}

#[test]
fn test_honest_session_is_quiet() {
    let mut rig = Rig::new(&DetectorSettings::default());
    rig.start();
    for _ in 0..400 {
        rig.frame(1);
    }
    assert!(rig.bus.drain().is_empty());
    assert!(rig.detectors.iter().all(|d| d.state() == DetectorState::Sampling));
}

#[test]
fn test_each_cheat_reaches_the_bus() {
    let mut rig = Rig::new(&DetectorSettings::default());
    rig.start();
    rig.frame(1);

    // Speed hack: double speed for a few seconds.
    for _ in 0..16 {
        rig.frame(2);
    }
    // Injection: a foreign library appears.
    rig.libraries.push("/data/local/tmp/libfrida-gadget.so");
    // Time cheat: device clock jumps a day ahead.
    rig.wall.advance_millis(24 * 60 * 60 * 1_000);
    for _ in 0..60 {
        rig.frame(1);
    }

    let kinds: Vec<DetectionKind> = rig.bus.drain().into_iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&DetectionKind::SpeedHack));
    assert!(kinds.contains(&DetectionKind::Injection));
    assert!(kinds.contains(&DetectionKind::TimeCheat));
    assert_eq!(kinds.iter().filter(|k| **k == DetectionKind::Injection).count(), 1);
}

#[test]
fn test_disabled_sections_stay_idle() {
    let settings = DetectorSettings::from_toml_str(
        "[speed_hack]\nenabled = false\n[injection]\nenabled = false\n",
    )
    .unwrap();
    let mut rig = Rig::new(&settings);
    rig.start();
    for _ in 0..40 {
        rig.frame(3);
    }
    assert_eq!(rig.detectors[0].state(), DetectorState::Idle);
    assert_eq!(rig.detectors[2].state(), DetectorState::Idle);
    assert!(rig.bus.drain().iter().all(|e| e.kind != DetectionKind::SpeedHack));
}

/// An obscured value whose decoy a memory editor froze.
struct FrozenDecoy;

impl DataIntegrity for FrozenDecoy {
    fn is_data_valid_within(&self, _: &Tolerances) -> bool {
        false
    }

    fn type_name(&self) -> &'static str {
        "int"
    }
}

#[test]
fn test_sentinel_reaches_the_bus() {
    let bus = DetectionBus::new();
    let mut detector = ObscuredCheatingDetector::new(
        DetectorSettings::default().obscured_cheating,
        Box::new(ManualClock::new(0)),
        bus.sink(),
    );
    detector.start();

    let mut coins = ObscuredInt::new(10);
    coins += 5;
    assert!(detector.inspect("coins", &coins));
    assert_eq!(coins, 15);
    assert_eq!(bus.pending(), 0);

    assert!(!detector.inspect("gold", &FrozenDecoy));
    let events = bus.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, DetectionKind::ObscuredTampering);
    assert_eq!(events[0].detector, ObscuredCheatingDetector::NAME);
    assert!(events[0].details.contains(&"label=gold".to_string()));
}
