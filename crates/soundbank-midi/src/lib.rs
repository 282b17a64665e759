//! MIDI decoding for the soundbank instrument layer.
//!
//! The host hands every instance raw 2-3 byte channel messages. This crate turns
//! them into typed [`MidiEvent`]s and provides the small note/velocity helpers
//! the event translator needs.
//!
//! # Example
//!
//! ```ignore
//! use soundbank_midi::{ChannelMessage, RawMidiEvent};
//!
//! let event = RawMidiEvent::from_bytes(&[0x90, 60, 100])?.decode()?;
//! assert_eq!(event.msg, ChannelMessage::NoteOn { note: 60, velocity: 100 });
//! ```

pub mod error;
pub use error::{Error, Result};

pub use event::{cc, ChannelMessage, MidiEvent, RawMidiEvent};
pub use utils::{gain_to_velocity, transpose_note, velocity_to_gain};

pub(crate) mod event;
pub(crate) mod utils;
