//! SoundFont (.sf2) synthesis via RustySynth.
//!
//! Provides [`SoundFontBackend`], a [`SynthBackend`](crate::SynthBackend) that
//! owns one parsed SoundFont and one RustySynth synthesizer.

mod backend;

pub use backend::{SoundFontBackend, SoundFontConfig};
