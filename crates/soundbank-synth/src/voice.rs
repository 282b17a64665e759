//! Per-note pitch snapshots.
//!
//! Notes are released at the pitch they were triggered at, even if the
//! transposition changed while they were held. The tracker maps each incoming
//! (source) note to the pitch actually sounding.
//!
//! All methods are RT-safe (no allocations).

/// Maps source notes to the effective pitch they are sounding at.
#[derive(Debug, Clone)]
pub struct VoiceTracker {
    sounding: [Option<u8>; 128],
    active: usize,
}

impl Default for VoiceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VoiceTracker {
    pub fn new() -> Self {
        Self {
            sounding: [None; 128],
            active: 0,
        }
    }

    /// Record that `source` now sounds at `pitch`.
    ///
    /// Returns the pitch a previous, unreleased trigger of the same source note
    /// was sounding at, so the caller can release it first.
    pub fn note_on(&mut self, source: u8, pitch: u8) -> Option<u8> {
        let slot = &mut self.sounding[(source & 0x7F) as usize];
        let previous = slot.replace(pitch);
        if previous.is_none() {
            self.active += 1;
        }
        previous
    }

    /// Forget `source`, returning the pitch it was sounding at.
    pub fn note_off(&mut self, source: u8) -> Option<u8> {
        let released = self.sounding[(source & 0x7F) as usize].take();
        if released.is_some() {
            self.active -= 1;
        }
        released
    }

    pub fn sounding_pitch(&self, source: u8) -> Option<u8> {
        self.sounding[(source & 0x7F) as usize]
    }

    /// Number of source notes currently held.
    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn clear(&mut self) {
        self.sounding = [None; 128];
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_off() {
        let mut tracker = VoiceTracker::new();
        assert_eq!(tracker.note_on(60, 84), None);
        assert_eq!(tracker.active_count(), 1);
        assert_eq!(tracker.sounding_pitch(60), Some(84));

        assert_eq!(tracker.note_off(60), Some(84));
        assert_eq!(tracker.active_count(), 0);
        assert_eq!(tracker.sounding_pitch(60), None);
    }

    #[test]
    fn test_retrigger_returns_previous_pitch() {
        let mut tracker = VoiceTracker::new();
        tracker.note_on(60, 72);
        assert_eq!(tracker.note_on(60, 84), Some(72));
        assert_eq!(tracker.active_count(), 1);
        assert_eq!(tracker.note_off(60), Some(84));
    }

    #[test]
    fn test_unknown_note_off() {
        let mut tracker = VoiceTracker::new();
        assert_eq!(tracker.note_off(61), None);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut tracker = VoiceTracker::new();
        tracker.note_on(60, 60);
        tracker.note_on(64, 64);
        tracker.note_on(67, 67);
        tracker.clear();
        assert_eq!(tracker.active_count(), 0);
        assert_eq!(tracker.note_off(64), None);
    }
}
