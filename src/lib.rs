//! # Soundbank - SoundFont instrument control layer
//!
//! Owns which bank and patch are active, turns incoming MIDI into synthesis
//! calls, and renders fixed-size blocks of interleaved 16-bit stereo for a host.
//!
//! ## Architecture
//!
//! Soundbank is an umbrella crate over:
//! - **soundbank-midi** - raw 2-3 byte channel message decoding
//! - **soundbank-synth** - the [`SynthBackend`] capability interface, the
//!   SoundFont engine, per-note pitch snapshots and a recording mock backend
//!
//! and contains the instrument itself:
//! - **catalog** - bank file discovery with stable ordering
//! - **selector** - active bank/patch and safe switching
//! - **translator** - MIDI to backend calls with transpose and clamping
//! - **params / state** - string key/value protocol and save/restore
//! - **render** - float to clipped 16-bit output
//! - **manager / single** - multi-instance lifecycle and single-instance adapter
//!
//! ## Quick Start
//!
//! ```ignore
//! use soundbank::prelude::*;
//!
//! let mut manager = InstanceManager::builder()
//!     .sample_rate(44100)
//!     .frames_per_block(128)
//!     .build()?;
//!
//! let id = manager.create_instance("/opt/modules/sf2", Some(r#"{"soundfont_path":"piano.sf2"}"#))?;
//! manager.on_midi(id, &[0x90, 60, 100]);
//! manager.set_param(id, "octave_transpose", "1")?;
//!
//! let mut block = vec![0i16; 2 * 128];
//! manager.render_block(id, &mut block);
//! ```
//!
//! ## Threading
//!
//! Instances are not internally locked. The host must never render an instance
//! while a parameter or MIDI call on the same instance is in progress. Separate
//! instances need no coordination.
//!
//! ## Feature Flags
//!
//! - `default` - SoundFont engine
//! - `soundfont` - SoundFont (.sf2) synthesis via RustySynth

mod error;
pub use error::{Error, Result};

pub mod catalog;
pub mod config;
mod instance;
mod manager;
mod params;
mod render;
pub mod selector;
mod single;
mod state;
mod translator;

pub use catalog::BankEntry;
pub use config::{HostConfig, InstanceDefaults};
pub use instance::{Instance, MAX_GAIN, MAX_OCTAVE_TRANSPOSE, MIN_GAIN, MIN_OCTAVE_TRANSPOSE};
pub use manager::{BackendFactory, InstanceId, InstanceManager, InstanceManagerBuilder};
pub use selector::{BankSelector, PatchEntry};
pub use single::SingleInstance;
pub use state::RestoreReport;

/// Re-export of soundbank-midi for direct access
pub use soundbank_midi as midi;

/// Re-export of soundbank-synth for direct access
pub use soundbank_synth as synth;

pub use soundbank_synth::{BankHandle, SynthBackend};

#[cfg(feature = "soundfont")]
pub use soundbank_synth::{SoundFontBackend, SoundFontConfig};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{HostConfig, Instance, InstanceId, InstanceManager, SingleInstance};
    pub use crate::{Error, Result};
}
