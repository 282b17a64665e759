//! Host and instance configuration.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::warn;

use crate::{Error, Result};

/// Audio parameters negotiated once with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    pub sample_rate: u32,
    /// Frames per render call agreed with the host.
    pub frames_per_block: usize,
    /// Maximum simultaneous voices per instance.
    pub polyphony: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frames_per_block: 128,
            polyphony: 64,
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if !(16000..=192000).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (16000-192000 Hz)",
                self.sample_rate
            )));
        }
        if !(1..=4096).contains(&self.frames_per_block) {
            return Err(Error::InvalidConfig(format!(
                "frames_per_block {} out of range (1-4096)",
                self.frames_per_block
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

    #[cfg(feature = "soundfont")]
    pub fn soundfont_config(&self) -> soundbank_synth::SoundFontConfig {
        soundbank_synth::SoundFontConfig {
            sample_rate: self.sample_rate,
            polyphony: self.polyphony,
        }
    }
}

/// Default-configuration blob passed by the host at instance creation.
///
/// Every field is optional. A missing or malformed blob yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InstanceDefaults {
    /// Preferred bank: a path, or a file name matched against the catalog.
    pub soundfont_path: Option<PathBuf>,
    pub octave_transpose: Option<i32>,
    pub gain: Option<f32>,
}

impl InstanceDefaults {
    pub fn parse(blob: Option<&str>) -> Self {
        let Some(blob) = blob.map(str::trim).filter(|b| !b.is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<Self>(blob) {
            Ok(mut defaults) => {
                if defaults
                    .soundfont_path
                    .as_ref()
                    .is_some_and(|p| p.as_os_str().is_empty())
                {
                    defaults.soundfont_path = None;
                }
                defaults
            }
            Err(e) => {
                warn!("Ignoring malformed instance defaults: {}", e);
                Self::default()
            }
        }
    }
}
