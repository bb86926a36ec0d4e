//! HID media-key report encoding and emission.
//!
//! Wire contract: the input report is exactly one byte, one bit per consumer
//! control key, matching the report map the GATT service advertises. A key
//! event is a pulse, not a held state — every emission is a press
//! notification followed immediately by an all-zero release notification, so
//! the peer never observes a stuck key.
//!
//! Delivery is best-effort. A failed notification is logged and dropped;
//! nothing here retries or feeds back into the resolution logic.

use log::debug;

use crate::registry::Action;

/// Consumer-control keys of the one-byte input report, each owning one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
// Configuration and the AC keys are advertised by the report map even though
// no default button binds them.
#[allow(dead_code)]
pub enum MediaKey {
    /// AL Consumer Control Configuration (usage 0x0183).
    Configuration,
    PlayPause,
    NextTrack,
    PrevTrack,
    VolumeUp,
    VolumeDown,
    AcForward,
    AcBack,
}

impl MediaKey {
    /// Bit position within the report byte. Byte-exact contract with the
    /// advertised report map; do not reorder.
    pub const fn mask(self) -> u8 {
        match self {
            MediaKey::Configuration => 1 << 0,
            MediaKey::PlayPause => 1 << 1,
            MediaKey::NextTrack => 1 << 2,
            MediaKey::PrevTrack => 1 << 3,
            MediaKey::VolumeUp => 1 << 4,
            MediaKey::VolumeDown => 1 << 5,
            MediaKey::AcForward => 1 << 6,
            MediaKey::AcBack => 1 << 7,
        }
    }

    /// Key for a resolved action. `None` for actions without a consumer
    /// control mapping (the page-navigation placeholders); those are legal
    /// resolutions with a no-op encoding, not errors.
    pub fn for_action(action: Action) -> Option<MediaKey> {
        match action {
            Action::VolumeUp => Some(MediaKey::VolumeUp),
            Action::VolumeDown => Some(MediaKey::VolumeDown),
            Action::Pause => Some(MediaKey::PlayPause),
            Action::Next => Some(MediaKey::NextTrack),
            Action::Previous => Some(MediaKey::PrevTrack),
            _ => None,
        }
    }
}

/// The one-byte input report. Transient: cleared back to all-zero after
/// every press/release pair.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MediaReport(u8);

impl MediaReport {
    pub fn set(&mut self, key: MediaKey) {
        self.0 |= key.mask();
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Fixed-width wire form.
    pub fn to_bytes(self) -> [u8; 1] {
        [self.0]
    }
}

/// Notification transport, typically the GATT input-report characteristic.
/// Best-effort; the core never consumes an acknowledgment.
pub trait NotifySink {
    fn notify(&mut self, report: &[u8; 1]) -> anyhow::Result<()>;
}

/// Sink that logs reports instead of delivering them. Stands in for the
/// transport on host builds and during bring-up.
pub struct LogSink;

impl NotifySink for LogSink {
    fn notify(&mut self, report: &[u8; 1]) -> anyhow::Result<()> {
        debug!("notify report {:#04x}", report[0]);
        Ok(())
    }
}

/// Turns resolved actions into press/release notification pairs.
pub struct ReportEmitter {
    report: MediaReport,
}

impl ReportEmitter {
    pub fn new() -> Self {
        Self {
            report: MediaReport::default(),
        }
    }

    /// Emit the report pulse(s) for `action`. Unmapped actions send nothing.
    pub fn emit<S: NotifySink>(&mut self, sink: &mut S, action: Action) {
        let Some(key) = MediaKey::for_action(action) else {
            return;
        };
        self.pulse(sink, key, pulse_count(action));
    }

    /// Send `count` press/release pairs for `key`. Normally one pair; the
    /// count exists for future multi-pulse actions.
    fn pulse<S: NotifySink>(&mut self, sink: &mut S, key: MediaKey, count: u8) {
        for _ in 0..count {
            self.report.set(key);
            send(sink, self.report);
            self.report.clear();
            send(sink, self.report);
        }
    }
}

impl Default for ReportEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn pulse_count(action: Action) -> u8 {
    match action {
        Action::DoublePageUp => 2,
        _ => 1,
    }
}

fn send<S: NotifySink>(sink: &mut S, report: MediaReport) {
    if let Err(err) = sink.notify(&report.to_bytes()) {
        // Fire-and-forget: a peer that missed a pulse missed it.
        debug!("dropped notification: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSink {
        sent: Vec<u8>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { sent: Vec::new() }
        }
    }

    impl NotifySink for RecordingSink {
        fn notify(&mut self, report: &[u8; 1]) -> anyhow::Result<()> {
            self.sent.push(report[0]);
            Ok(())
        }
    }

    struct FailingSink;

    impl NotifySink for FailingSink {
        fn notify(&mut self, _report: &[u8; 1]) -> anyhow::Result<()> {
            anyhow::bail!("no subscriber")
        }
    }

    #[test]
    fn key_bits_match_report_map() {
        assert_eq!(MediaKey::Configuration.mask(), 0x01);
        assert_eq!(MediaKey::PlayPause.mask(), 0x02);
        assert_eq!(MediaKey::NextTrack.mask(), 0x04);
        assert_eq!(MediaKey::PrevTrack.mask(), 0x08);
        assert_eq!(MediaKey::VolumeUp.mask(), 0x10);
        assert_eq!(MediaKey::VolumeDown.mask(), 0x20);
        assert_eq!(MediaKey::AcForward.mask(), 0x40);
        assert_eq!(MediaKey::AcBack.mask(), 0x80);
    }

    #[test]
    fn action_mapping() {
        assert_eq!(MediaKey::for_action(Action::VolumeUp), Some(MediaKey::VolumeUp));
        assert_eq!(MediaKey::for_action(Action::Pause), Some(MediaKey::PlayPause));
        assert_eq!(MediaKey::for_action(Action::Next), Some(MediaKey::NextTrack));
        assert_eq!(MediaKey::for_action(Action::Previous), Some(MediaKey::PrevTrack));
        assert_eq!(MediaKey::for_action(Action::PageUp), None);
        assert_eq!(MediaKey::for_action(Action::PageDown), None);
        assert_eq!(MediaKey::for_action(Action::Reset), None);
        assert_eq!(MediaKey::for_action(Action::Invalid), None);
        assert_eq!(MediaKey::for_action(Action::RepeatSinglePress), None);
    }

    #[test]
    fn emit_sends_press_then_release() {
        let mut emitter = ReportEmitter::new();
        let mut sink = RecordingSink::new();
        emitter.emit(&mut sink, Action::VolumeDown);
        assert_eq!(sink.sent, vec![0x20, 0x00]);
        // Report left all-zero for the next action.
        assert_eq!(emitter.report, MediaReport::default());
    }

    #[test]
    fn unmapped_action_sends_nothing() {
        let mut emitter = ReportEmitter::new();
        let mut sink = RecordingSink::new();
        emitter.emit(&mut sink, Action::PageUp);
        emitter.emit(&mut sink, Action::DoublePageUp);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn pulse_count_drives_pair_count() {
        let mut emitter = ReportEmitter::new();
        let mut sink = RecordingSink::new();
        emitter.pulse(&mut sink, MediaKey::PlayPause, 2);
        assert_eq!(sink.sent, vec![0x02, 0x00, 0x02, 0x00]);
    }

    #[test]
    fn delivery_failure_is_swallowed() {
        let mut emitter = ReportEmitter::new();
        emitter.emit(&mut FailingSink, Action::Pause);
        // No panic, and the emitter is clean for the next cycle.
        assert_eq!(emitter.report, MediaReport::default());
    }
}
