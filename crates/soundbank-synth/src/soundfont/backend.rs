//! SoundFont backend wrapping RustySynth.

use rustysynth::{SoundFont, Synthesizer, SynthesizerSettings};
use soundbank_midi::{cc, gain_to_velocity};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::backend::{BankHandle, PatchInfo, SynthBackend};
use crate::error::{Error, Result};

/// RustySynth's own master volume; gain 1.0 maps onto it.
const DEFAULT_MASTER_VOLUME: f32 = 0.5;

/// The single MIDI channel every instance plays on.
const CHANNEL: i32 = 0;

/// Engine settings negotiated with the host at instance creation.
#[derive(Debug, Clone, Copy)]
pub struct SoundFontConfig {
    pub sample_rate: u32,
    pub polyphony: usize,
}

impl Default for SoundFontConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            polyphony: 64,
        }
    }
}

impl SoundFontConfig {
    pub fn validate(&self) -> Result<()> {
        if !(16000..=192000).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (16000-192000 Hz)",
                self.sample_rate
            )));
        }
        if !(8..=256).contains(&self.polyphony) {
            return Err(Error::InvalidConfig(format!(
                "polyphony {} out of range (8-256)",
                self.polyphony
            )));
        }
        Ok(())
    }
}

struct LoadedBank {
    handle: BankHandle,
    soundfont: Arc<SoundFont>,
    synthesizer: Synthesizer,
}

/// SoundFont engine. Each instance owns its own parsed file and synthesizer.
pub struct SoundFontBackend {
    settings: SynthesizerSettings,
    sample_rate: u32,
    gain: f32,
    loaded: Option<LoadedBank>,
}

impl SoundFontBackend {
    pub fn new(config: SoundFontConfig) -> Result<Self> {
        config.validate()?;

        let mut settings = SynthesizerSettings::new(config.sample_rate as i32);
        settings.maximum_polyphony = config.polyphony;

        Ok(Self {
            settings,
            sample_rate: config.sample_rate,
            gain: 1.0,
            loaded: None,
        })
    }

    fn synthesizer(&mut self) -> Option<&mut Synthesizer> {
        self.loaded.as_mut().map(|bank| &mut bank.synthesizer)
    }
}

impl SynthBackend for SoundFontBackend {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn load_bank(&mut self, path: &Path) -> Result<BankHandle> {
        // Drop the previous synthesizer before parsing so only one bank is resident.
        self.loaded = None;

        let file = File::open(path).map_err(|e| Error::bank_load(path, e))?;
        let mut reader = BufReader::new(file);
        let soundfont = Arc::new(SoundFont::new(&mut reader).map_err(|e| Error::bank_load(path, e))?);

        let mut synthesizer =
            Synthesizer::new(&soundfont, &self.settings).map_err(|e| Error::bank_load(path, e))?;
        synthesizer.set_master_volume(DEFAULT_MASTER_VOLUME * self.gain);

        let handle = BankHandle::next();
        debug!(
            "Loaded SoundFont {} as handle {} ({} presets)",
            path.display(),
            handle.id(),
            soundfont.get_presets().len()
        );

        self.loaded = Some(LoadedBank {
            handle,
            soundfont,
            synthesizer,
        });
        Ok(handle)
    }

    fn unload_bank(&mut self, handle: BankHandle) {
        if self.loaded.as_ref().is_some_and(|bank| bank.handle == handle) {
            self.loaded = None;
            debug!("Unloaded SoundFont handle {}", handle.id());
        }
    }

    fn patches(&self, handle: BankHandle) -> Result<Vec<PatchInfo>> {
        let bank = self
            .loaded
            .as_ref()
            .filter(|bank| bank.handle == handle)
            .ok_or(Error::UnknownHandle(handle))?;

        Ok(bank
            .soundfont
            .get_presets()
            .iter()
            .map(|preset| PatchInfo {
                name: preset.get_name().to_string(),
                bank: preset.get_bank_number(),
                program: preset.get_patch_number(),
            })
            .collect())
    }

    fn select_program(&mut self, bank: i32, program: i32) {
        if let Some(synth) = self.synthesizer() {
            synth.process_midi_message(CHANNEL, 0xB0, cc::BANK_SELECT as i32, bank);
            synth.process_midi_message(CHANNEL, 0xC0, program, 0);
        }
    }

    fn trigger_voice(&mut self, note: u8, velocity: f32) {
        if let Some(synth) = self.synthesizer() {
            synth.note_on(CHANNEL, note as i32, gain_to_velocity(velocity) as i32);
        }
    }

    fn release_voice(&mut self, note: u8) {
        if let Some(synth) = self.synthesizer() {
            synth.note_off(CHANNEL, note as i32);
        }
    }

    fn release_all(&mut self, immediate: bool) {
        if let Some(synth) = self.synthesizer() {
            synth.note_off_all(immediate);
        }
    }

    fn set_pitch_bend(&mut self, bend: u16) {
        if let Some(synth) = self.synthesizer() {
            let lsb = (bend & 0x7F) as i32;
            let msb = ((bend >> 7) & 0x7F) as i32;
            synth.process_midi_message(CHANNEL, 0xE0, lsb, msb);
        }
    }

    fn supports_gain(&self) -> bool {
        true
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
        if let Some(synth) = self.synthesizer() {
            synth.set_master_volume(DEFAULT_MASTER_VOLUME * gain);
        }
    }

    fn control_change(&mut self, controller: u8, value: u8) {
        if let Some(synth) = self.synthesizer() {
            synth.process_midi_message(CHANNEL, 0xB0, controller as i32, value as i32);
        }
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());
        match self.synthesizer() {
            Some(synth) => synth.render(left, right),
            None => {
                left.fill(0.0);
                right.fill(0.0);
            }
        }
    }
}
