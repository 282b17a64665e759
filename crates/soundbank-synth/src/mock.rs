//! Recording backend.
//!
//! Doesn't synthesize anything. Every call is recorded, sounding notes are
//! tracked, and rendering outputs a constant level per sounding voice, which is
//! enough to observe silencing, gain and clipping from the outside.
//!
//! Bank files are plain text: a `MOCKBANK` header line followed by one patch
//! name per line, where a lone [`UNNAMED_PATCH`] marks a patch the bank leaves
//! unnamed. Clones share state, so a test keeps one clone as a probe after
//! boxing the other into an instance.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{BankHandle, PatchInfo, SynthBackend};
use crate::error::{Error, Result};

const HEADER: &str = "MOCKBANK";

/// Bank-file line for a patch with an empty name.
pub const UNNAMED_PATCH: &str = "-";

/// A call made on the backend, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    LoadBank(PathBuf),
    UnloadBank(BankHandle),
    SelectProgram { bank: i32, program: i32 },
    TriggerVoice { note: u8, velocity: f32 },
    ReleaseVoice { note: u8 },
    ReleaseAll { immediate: bool },
    PitchBend(u16),
    Gain(f32),
    ControlChange { controller: u8, value: u8 },
    ChannelPressure(u8),
    PolyPressure { note: u8, pressure: u8 },
}

#[derive(Debug)]
struct MockState {
    calls: Vec<BackendCall>,
    loaded: Option<(BankHandle, Vec<PatchInfo>)>,
    voices: Vec<u8>,
    gain: f32,
}

/// Backend that records calls instead of producing sound.
#[derive(Clone)]
pub struct MockBackend {
    sample_rate: u32,
    voice_level: f32,
    gain_capable: bool,
    pressure_capable: bool,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(44100)
    }
}

impl MockBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            voice_level: 0.25,
            gain_capable: true,
            pressure_capable: false,
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                loaded: None,
                voices: Vec::new(),
                gain: 1.0,
            })),
        }
    }

    /// Output level contributed by each sounding voice.
    pub fn with_voice_level(mut self, level: f32) -> Self {
        self.voice_level = level;
        self
    }

    pub fn with_gain_support(mut self, supported: bool) -> Self {
        self.gain_capable = supported;
        self
    }

    pub fn with_pressure_support(mut self, supported: bool) -> Self {
        self.pressure_capable = supported;
        self
    }

    /// Write a bank file this backend can load.
    pub fn write_bank_file(path: impl AsRef<Path>, patch_names: &[&str]) -> std::io::Result<()> {
        let mut contents = String::from(HEADER);
        for name in patch_names {
            contents.push('\n');
            contents.push_str(name);
        }
        contents.push('\n');
        std::fs::write(path, contents)
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Notes currently sounding, in trigger order.
    pub fn sounding_notes(&self) -> Vec<u8> {
        self.state.lock().voices.clone()
    }

    pub fn loaded_handle(&self) -> Option<BankHandle> {
        self.state.lock().loaded.as_ref().map(|(handle, _)| *handle)
    }

    /// How many times `handle` was passed to `unload_bank`.
    pub fn unload_count(&self, handle: BankHandle) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| **call == BackendCall::UnloadBank(handle))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.state.lock().calls.push(call);
    }

    fn parse_bank(path: &Path) -> Result<Vec<PatchInfo>> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::bank_load(path, e))?;
        let mut lines = contents.lines();
        if lines.next().map(str::trim) != Some(HEADER) {
            return Err(Error::bank_load(path, "missing MOCKBANK header"));
        }

        Ok(lines
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(index, name)| PatchInfo {
                name: if name == UNNAMED_PATCH {
                    String::new()
                } else {
                    name.to_string()
                },
                bank: 0,
                program: index as i32,
            })
            .collect())
    }
}

impl SynthBackend for MockBackend {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn load_bank(&mut self, path: &Path) -> Result<BankHandle> {
        self.record(BackendCall::LoadBank(path.to_path_buf()));

        let mut state = self.state.lock();
        state.loaded = None;
        state.voices.clear();

        let patches = Self::parse_bank(path)?;
        let handle = BankHandle::next();
        state.loaded = Some((handle, patches));
        Ok(handle)
    }

    fn unload_bank(&mut self, handle: BankHandle) {
        self.record(BackendCall::UnloadBank(handle));

        let mut state = self.state.lock();
        if state.loaded.as_ref().is_some_and(|(h, _)| *h == handle) {
            state.loaded = None;
            state.voices.clear();
        }
    }

    fn patches(&self, handle: BankHandle) -> Result<Vec<PatchInfo>> {
        match &self.state.lock().loaded {
            Some((h, patches)) if *h == handle => Ok(patches.clone()),
            _ => Err(Error::UnknownHandle(handle)),
        }
    }

    fn select_program(&mut self, bank: i32, program: i32) {
        self.record(BackendCall::SelectProgram { bank, program });
    }

    fn trigger_voice(&mut self, note: u8, velocity: f32) {
        self.record(BackendCall::TriggerVoice { note, velocity });

        let mut state = self.state.lock();
        if state.loaded.is_some() {
            state.voices.push(note);
        }
    }

    fn release_voice(&mut self, note: u8) {
        self.record(BackendCall::ReleaseVoice { note });
        self.state.lock().voices.retain(|&n| n != note);
    }

    fn release_all(&mut self, immediate: bool) {
        self.record(BackendCall::ReleaseAll { immediate });
        self.state.lock().voices.clear();
    }

    fn set_pitch_bend(&mut self, bend: u16) {
        self.record(BackendCall::PitchBend(bend));
    }

    fn supports_gain(&self) -> bool {
        self.gain_capable
    }

    fn set_gain(&mut self, gain: f32) {
        self.record(BackendCall::Gain(gain));
        if self.gain_capable {
            self.state.lock().gain = gain;
        }
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        self.record(BackendCall::ControlChange { controller, value });
    }

    fn supports_pressure(&self) -> bool {
        self.pressure_capable
    }

    fn channel_pressure(&mut self, pressure: u8) {
        self.record(BackendCall::ChannelPressure(pressure));
    }

    fn poly_pressure(&mut self, note: u8, pressure: u8) {
        self.record(BackendCall::PolyPressure { note, pressure });
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let state = self.state.lock();
        let level = if state.loaded.is_some() {
            state.voices.len() as f32 * self.voice_level * state.gain
        } else {
            0.0
        };
        left.fill(level);
        right.fill(level);
    }
}
