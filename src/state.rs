//! Save/restore of an instance's logical state.
//!
//! The state string is a flat JSON object:
//!
//! ```text
//! {"soundfont_name":"b.sf2","soundfont_index":1,"preset":3,"octave_transpose":-1,"gain":1.0}
//! ```
//!
//! The bank is stored by display name because catalog indices shift when files
//! are added or removed. The index is only a fallback.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::instance::Instance;

#[derive(Debug, Serialize)]
struct SavedState<'a> {
    soundfont_name: &'a str,
    soundfont_index: i64,
    preset: usize,
    octave_transpose: i8,
    gain: f32,
}

/// Outcome of a best-effort restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Fields that were missing, malformed, or could not be applied.
    pub skipped: Vec<&'static str>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, field: &'static str) {
        debug!("State field '{}' not restored", field);
        self.skipped.push(field);
    }
}

impl Instance {
    /// Encode bank, patch, transpose and gain.
    pub fn serialize_state(&self) -> String {
        let selector = self.selector();
        let state = SavedState {
            soundfont_name: selector.active_bank_display_name(),
            soundfont_index: selector
                .active_bank_index()
                .map(|i| i as i64)
                .unwrap_or(-1),
            preset: selector.active_patch_index(),
            octave_transpose: self.octave_transpose(),
            gain: round_gain(self.gain()),
        };
        // A struct of plain fields always serializes
        serde_json::to_string(&state).unwrap_or_default()
    }

    /// Apply a string from [`Instance::serialize_state`].
    ///
    /// Bank first (by name, then by index), then preset, transpose and gain.
    /// Each field is applied independently: a bad field is skipped and reported,
    /// the rest are still applied.
    pub fn restore_state(&mut self, state: &str) -> RestoreReport {
        let mut report = RestoreReport::default();

        let fields = match serde_json::from_str::<Value>(state) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) => {
                warn!("Unreadable state string, nothing restored");
                report.skipped = vec!["soundfont", "preset", "octave_transpose", "gain"];
                return report;
            }
        };

        if !self.restore_bank(&fields) {
            report.skip("soundfont");
        }

        match int_field(&fields, "preset") {
            Some(preset) if self.selector().patch_count() > 0 => self.select_patch(preset),
            _ => report.skip("preset"),
        }

        match int_field(&fields, "octave_transpose") {
            Some(octaves) => {
                self.set_octave_transpose(octaves.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
            }
            None => report.skip("octave_transpose"),
        }

        match float_field(&fields, "gain") {
            Some(gain) => {
                self.set_gain(gain as f32);
            }
            None => report.skip("gain"),
        }

        report
    }

    fn restore_bank(&mut self, fields: &Map<String, Value>) -> bool {
        let by_name = fields
            .get("soundfont_name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .and_then(|name| self.selector().find_bank_by_display_name(name));

        let by_index = || {
            int_field(fields, "soundfont_index")
                .filter(|&i| i >= 0 && (i as usize) < self.selector().bank_count())
                .map(|i| i as usize)
        };

        let Some(index) = by_name.or_else(by_index) else {
            return false;
        };

        if self.selector().active_bank_index() == Some(index) {
            return true;
        }
        self.select_bank_by_index(index as i64).is_ok()
    }
}

fn round_gain(gain: f32) -> f32 {
    (gain * 100.0).round() / 100.0
}

/// Integer field, also accepted as a float or a numeric string.
fn int_field(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite())
}
