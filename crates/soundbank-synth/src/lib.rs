//! Synthesis backends for the soundbank instrument layer.
//!
//! The instrument never talks to a DSP engine directly. Everything goes through
//! the [`SynthBackend`] capability interface, so engines can be swapped without
//! touching bank selection, event translation or rendering:
//!
//! - **[`SynthBackend`]** - load/enumerate/trigger/release/render interface
//! - **[`SoundFontBackend`]** - SoundFont (.sf2) engine (feature: `soundfont`)
//! - **[`MockBackend`]** - recording backend for tests and headless hosts
//! - **[`VoiceTracker`]** - per-note pitch snapshots for stuck-note-free release
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `soundfont` | SoundFont (.sf2) synthesis via RustySynth (default) |

pub mod error;
pub use error::{Error, Result};

mod backend;

pub use backend::{BankHandle, PatchInfo, SynthBackend};

mod voice;

pub use voice::VoiceTracker;

pub mod mock;

pub use mock::{BackendCall, MockBackend, UNNAMED_PATCH};

#[cfg(feature = "soundfont")]
mod soundfont;

#[cfg(feature = "soundfont")]
pub use soundfont::{SoundFontBackend, SoundFontConfig};
