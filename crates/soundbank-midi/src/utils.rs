//! MIDI utility functions

#[inline]
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

#[inline]
pub fn gain_to_velocity(gain: f32) -> u8 {
    (gain.clamp(0.0, 1.0) * 127.0).round() as u8
}

/// Shift `note` by whole octaves, clamping the result to the MIDI range.
#[inline]
pub fn transpose_note(note: u8, octaves: i8) -> u8 {
    (note as i32 + octaves as i32 * 12).clamp(0, 127) as u8
}
