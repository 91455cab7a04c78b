//! # Detection Events
//!
//! Detectors publish on an unbounded crossbeam channel, so emitting never
//! blocks the polling path. Events are consumed once: several receivers
//! compete for them rather than each seeing every event.

use crossbeam_channel::{unbounded, Receiver, Sender};

/// What was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetectionKind {
    /// Game clock running faster or slower than the reliable clock.
    SpeedHack,
    /// Wall clock moved far from the monotonic clock during the session.
    TimeCheat,
    /// Wall clock drifted, but not far enough to call it cheating.
    WrongTime,
    /// Library loaded that is not in the whitelist.
    Injection,
    /// Obscured value whose decoy no longer matches its encoding.
    ObscuredTampering,
}

/// A detection report.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionEvent {
    /// What was detected.
    pub kind: DetectionKind,
    /// Detector that raised it.
    pub detector: &'static str,
    /// Reliable ticks at detection time.
    pub at_ticks: u64,
    /// Human-readable description.
    pub description: String,
    /// Supporting details (drift samples, library names, value labels).
    pub details: Vec<String>,
}

/// Sending half handed to detectors.
#[derive(Clone, Debug)]
pub struct DetectionSink {
    sender: Sender<DetectionEvent>,
}

impl DetectionSink {
    /// Publishes an event.
    ///
    /// A bus with no receivers left drops the event.
    pub fn emit(&self, event: DetectionEvent) {
        tracing::warn!(
            "{} detected by {}: {}",
            kind_label(event.kind),
            event.detector,
            event.description
        );
        if self.sender.send(event).is_err() {
            tracing::debug!("Detection bus closed, event dropped");
        }
    }
}

/// Channel collecting detection events from every detector.
#[derive(Clone, Debug)]
pub struct DetectionBus {
    sender: Sender<DetectionEvent>,
    receiver: Receiver<DetectionEvent>,
}

impl DetectionBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Returns a sink for a detector.
    #[must_use]
    pub fn sink(&self) -> DetectionSink {
        DetectionSink {
            sender: self.sender.clone(),
        }
    }

    /// Returns a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> Receiver<DetectionEvent> {
        self.receiver.clone()
    }

    /// Takes every pending event.
    #[must_use]
    pub fn drain(&self) -> Vec<DetectionEvent> {
        self.receiver.try_iter().collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for DetectionBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Short label for log lines.
const fn kind_label(kind: DetectionKind) -> &'static str {
    match kind {
        DetectionKind::SpeedHack => "speed hack",
        DetectionKind::TimeCheat => "time cheat",
        DetectionKind::WrongTime => "wrong device time",
        DetectionKind::Injection => "injection",
        DetectionKind::ObscuredTampering => "obscured value tampering",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: DetectionKind) -> DetectionEvent {
        DetectionEvent {
            kind,
            detector: "test",
            at_ticks: 1,
            description: String::from("test event"),
            details: Vec::new(),
        }
    }

    #[test]
    fn test_sink_delivers_to_bus() {
        let bus = DetectionBus::new();
        let sink = bus.sink();
        sink.emit(event(DetectionKind::SpeedHack));
        sink.emit(event(DetectionKind::Injection));

        assert_eq!(bus.pending(), 2);
        let events = bus.drain();
        assert_eq!(events[0].kind, DetectionKind::SpeedHack);
        assert_eq!(events[1].kind, DetectionKind::Injection);
        assert_eq!(bus.pending(), 0);
    }
}
