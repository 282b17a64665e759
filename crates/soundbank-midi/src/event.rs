//! Raw and typed MIDI channel events.

use midly::live::LiveEvent;
use midly::MidiMessage;

use crate::error::{Error, Result};

/// Controller numbers with special meaning to the instrument.
pub mod cc {
    pub const BANK_SELECT: u8 = 0;
    pub const BANK_SELECT_LSB: u8 = 32;
    pub const ALL_SOUND_OFF: u8 = 120;
    pub const ALL_NOTES_OFF: u8 = 123;
}

/// Raw channel message as delivered by the host.
///
/// Messages that arrive one data byte short are padded with zero, so a two-byte
/// note-on reads as velocity 0 (a note-off).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMidiEvent {
    pub data: [u8; 3],
    /// Valid bytes in `data` (2-3).
    pub len: u8,
}

impl RawMidiEvent {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::TooShort(bytes.len()));
        }

        let status = bytes[0];
        if !(0x80..0xF0).contains(&status) {
            return Err(Error::UnsupportedStatus(status));
        }

        let len = message_len(status);
        let mut data = [0u8; 3];
        let available = bytes.len().min(len);
        data[..available].copy_from_slice(&bytes[..available]);

        Ok(Self {
            data,
            len: len as u8,
        })
    }

    pub fn decode(&self) -> Result<MidiEvent> {
        match LiveEvent::parse(&self.data[..self.len as usize])? {
            LiveEvent::Midi { channel, message } => Ok(MidiEvent {
                channel: channel.as_int(),
                msg: ChannelMessage::from(message),
            }),
            _ => Err(Error::UnsupportedStatus(self.data[0])),
        }
    }
}

fn message_len(status: u8) -> usize {
    match status & 0xF0 {
        0xC0 | 0xD0 => 2,
        _ => 3,
    }
}

/// Channel voice message, normalised for the instrument.
///
/// A note-on with velocity 0 is decoded as [`ChannelMessage::NoteOff`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    PolyPressure { note: u8, pressure: u8 },
    ControlChange { controller: u8, value: u8 },
    ProgramChange { program: u8 },
    ChannelPressure { pressure: u8 },
    /// 14-bit bend, 8192 is centre.
    PitchBend { bend: u16 },
}

impl From<MidiMessage> for ChannelMessage {
    fn from(message: MidiMessage) -> Self {
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => ChannelMessage::NoteOn {
                note: key.as_int(),
                velocity: vel.as_int(),
            },
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                ChannelMessage::NoteOff { note: key.as_int() }
            }
            MidiMessage::Aftertouch { key, vel } => ChannelMessage::PolyPressure {
                note: key.as_int(),
                pressure: vel.as_int(),
            },
            MidiMessage::Controller { controller, value } => ChannelMessage::ControlChange {
                controller: controller.as_int(),
                value: value.as_int(),
            },
            MidiMessage::ProgramChange { program } => ChannelMessage::ProgramChange {
                program: program.as_int(),
            },
            MidiMessage::ChannelAftertouch { vel } => ChannelMessage::ChannelPressure {
                pressure: vel.as_int(),
            },
            MidiMessage::PitchBend { bend } => ChannelMessage::PitchBend {
                bend: bend.0.as_int(),
            },
        }
    }
}

/// Decoded channel event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    pub channel: u8,
    pub msg: ChannelMessage,
}

impl MidiEvent {
    /// Decode a raw host message in one step.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        RawMidiEvent::from_bytes(bytes)?.decode()
    }

    /// True for the "all sound off" and "all notes off" controllers.
    #[inline]
    pub fn is_all_voices_off(&self) -> bool {
        matches!(
            self.msg,
            ChannelMessage::ControlChange {
                controller: cc::ALL_SOUND_OFF | cc::ALL_NOTES_OFF,
                ..
            }
        )
    }
}
