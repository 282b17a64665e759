//! Capability interface implemented by every synthesis engine.

use core::sync::atomic::{AtomicU64, Ordering};
use std::path::Path;

use crate::error::Result;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to a bank loaded by a backend.
///
/// Handles are unique for the lifetime of the process, so a handle released by
/// one instance can never alias a bank owned by another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BankHandle(u64);

impl BankHandle {
    /// Allocate a fresh handle. Backends call this once per successful load.
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the internal ID (for debugging/logging only)
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// One program as reported by the engine, in enumeration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchInfo {
    pub name: String,
    pub bank: i32,
    pub program: i32,
}

/// Synthesis engine as seen by the instrument.
///
/// A backend holds at most one loaded bank and plays a single logical MIDI
/// channel. Voice methods are no-ops while nothing is loaded, and
/// [`render`](SynthBackend::render) writes silence in that state.
pub trait SynthBackend: Send {
    /// Sample rate the engine renders at.
    fn sample_rate(&self) -> u32;

    /// Load a bank file, replacing whatever was loaded before.
    fn load_bank(&mut self, path: &Path) -> Result<BankHandle>;

    /// Release a loaded bank. Unknown handles are ignored.
    fn unload_bank(&mut self, handle: BankHandle);

    /// Every program in the bank, in the engine's enumeration order.
    fn patches(&self, handle: BankHandle) -> Result<Vec<PatchInfo>>;

    /// Make `bank`/`program` the program subsequent voices play.
    fn select_program(&mut self, bank: i32, program: i32);

    /// Start a voice. `velocity` is normalised to 0.0-1.0.
    fn trigger_voice(&mut self, note: u8, velocity: f32);

    fn release_voice(&mut self, note: u8);

    /// Release every voice. `immediate` cuts them without a release phase.
    fn release_all(&mut self, immediate: bool);

    /// 14-bit pitch bend applied to the whole instrument.
    fn set_pitch_bend(&mut self, bend: u16);

    /// Whether [`set_gain`](SynthBackend::set_gain) has any effect.
    fn supports_gain(&self) -> bool {
        false
    }

    /// Post gain, 0.0-2.0.
    fn set_gain(&mut self, _gain: f32) {}

    /// Generic controller message.
    fn control_change(&mut self, _controller: u8, _value: u8) {}

    /// Whether channel/poly pressure reaches the engine.
    fn supports_pressure(&self) -> bool {
        false
    }

    fn channel_pressure(&mut self, _pressure: u8) {}

    fn poly_pressure(&mut self, _note: u8, _pressure: u8) {}

    /// Render `left.len()` frames. Both buffers have the same length.
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique() {
        let a = BankHandle::next();
        let b = BankHandle::next();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }
}
