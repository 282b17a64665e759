//! MIDI event translation.
//!
//! Turns decoded channel events into selector/backend calls. Every incoming
//! channel is folded onto the instance's single logical channel.

use soundbank_midi::{cc, transpose_note, velocity_to_gain, ChannelMessage, MidiEvent};
use tracing::debug;

use crate::selector::BankSelector;

/// Apply one event synchronously.
pub(crate) fn apply(selector: &mut BankSelector, octave_transpose: i8, event: &MidiEvent) {
    match event.msg {
        ChannelMessage::NoteOn { note, velocity } => {
            let pitch = transpose_note(note, octave_transpose);
            selector.note_on(note, pitch, velocity_to_gain(velocity));
        }
        ChannelMessage::NoteOff { note } => {
            selector.note_off(note, transpose_note(note, octave_transpose));
        }
        ChannelMessage::ControlChange { .. } if event.is_all_voices_off() => {
            selector.all_voices_off(true);
        }
        // Banks are chosen through the parameter surface only
        ChannelMessage::ControlChange {
            controller: cc::BANK_SELECT | cc::BANK_SELECT_LSB,
            ..
        } => {}
        ChannelMessage::ControlChange { controller, value } => {
            selector.backend_mut().control_change(controller, value);
        }
        ChannelMessage::ProgramChange { program } => {
            if (program as usize) < selector.patch_count() {
                selector.select_patch(program as i64);
            } else {
                debug!(
                    "Ignoring program change {} ({} patches)",
                    program,
                    selector.patch_count()
                );
            }
        }
        ChannelMessage::PitchBend { bend } => {
            selector.backend_mut().set_pitch_bend(bend);
        }
        ChannelMessage::ChannelPressure { pressure } => {
            if selector.backend().supports_pressure() {
                selector.backend_mut().channel_pressure(pressure);
            }
        }
        ChannelMessage::PolyPressure { note, pressure } => {
            if selector.backend().supports_pressure() {
                let pitch = selector
                    .sounding_pitch(note)
                    .unwrap_or_else(|| transpose_note(note, octave_transpose));
                selector.backend_mut().poly_pressure(pitch, pressure);
            }
        }
    }
}
