//! String-keyed parameter surface.
//!
//! | Key | Set | Get |
//! |-----|-----|-----|
//! | `soundfont_path` | load a bank file | path of the loaded bank |
//! | `soundfont_index` | select catalog entry (wraps) | catalog index, `-1` if none |
//! | `next_soundfont` / `prev_soundfont` | relative navigation | |
//! | `preset` (`current_patch`) | select patch (wraps) | patch index |
//! | `octave_transpose` | clamp to [-4, 4] | integer |
//! | `gain` | clamp to [0, 2] | two decimals |
//! | `all_notes_off` / `panic` | release every voice | |
//! | `state` | best-effort restore | serialized state |
//! | `soundfont_name` (`bank_name`) | | bank display string |
//! | `soundfont_count` (`bank_count`) | | catalog size |
//! | `preset_name` (`patch_name`, `name`) | | patch name |
//! | `preset_count` (`total_patches`) | | patch count |
//! | `patch_in_bank` | | 1-based patch index |
//! | `load_error` | | last load error, empty if none |
//! | `soundfont_list` | | rescans, `[{"label":..,"index":..}]` |
//! | `ui_hierarchy` | | menu description for the host UI |

use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{debug, warn};

use crate::instance::Instance;
use crate::{Error, Result};

#[derive(Serialize)]
struct BankListItem<'a> {
    label: &'a str,
    index: usize,
}

impl Instance {
    /// Apply a parameter. Out-of-range numbers are clamped or wrapped; values
    /// that do not parse are rejected without changing anything.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "soundfont_path" => {
                let path = value.trim();
                if path.is_empty() {
                    return Err(Error::invalid_value(key, value));
                }
                self.load_bank(Path::new(path))
            }
            "soundfont_index" => self.select_bank_by_index(parse_int(key, value)?),
            "next_soundfont" => self.next_bank(),
            "prev_soundfont" => self.prev_bank(),
            "preset" | "current_patch" => {
                self.select_patch(parse_int(key, value)?);
                Ok(())
            }
            "octave_transpose" => {
                let octaves = parse_int(key, value)?;
                self.set_octave_transpose(octaves.clamp(i32::MIN as i64, i32::MAX as i64) as i32);
                Ok(())
            }
            "gain" => {
                let gain = parse_float(key, value)?;
                self.set_gain(gain);
                Ok(())
            }
            "all_notes_off" | "panic" => {
                self.panic();
                Ok(())
            }
            "state" => {
                let report = self.restore_state(value);
                if !report.is_complete() {
                    warn!("Partial state restore, skipped: {:?}", report.skipped);
                }
                Ok(())
            }
            _ => Err(Error::UnknownParameter(key.to_string())),
        }
    }

    /// Read a parameter.
    ///
    /// Takes `&mut self` because `soundfont_list` rescans the catalog.
    pub fn get_param(&mut self, key: &str) -> Result<String> {
        if key == "soundfont_list" {
            return Ok(self.bank_list());
        }

        let selector = self.selector();
        let value = match key {
            "load_error" => self.last_error().unwrap_or_default().to_string(),
            "soundfont_name" | "bank_name" => selector.bank_name().to_string(),
            "soundfont_path" => selector
                .active_bank_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "soundfont_count" | "bank_count" => selector.bank_count().to_string(),
            "soundfont_index" => selector
                .active_bank_index()
                .map(|i| i as i64)
                .unwrap_or(-1)
                .to_string(),
            "preset" | "current_patch" => selector.active_patch_index().to_string(),
            "patch_in_bank" => (selector.active_patch_index() + 1).to_string(),
            "preset_name" | "patch_name" | "name" => selector
                .active_patch()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            "preset_count" | "total_patches" => selector.patch_count().to_string(),
            "octave_transpose" => self.octave_transpose().to_string(),
            "gain" => format!("{:.2}", self.gain()),
            "state" => self.serialize_state(),
            "ui_hierarchy" => ui_hierarchy(),
            _ => return Err(Error::UnknownParameter(key.to_string())),
        };
        Ok(value)
    }

    /// Rescan and describe the catalog as `[{"label":..,"index":..}]`.
    fn bank_list(&mut self) -> String {
        let items: Vec<BankListItem> = self
            .rescan_catalog()
            .iter()
            .enumerate()
            .map(|(index, bank)| BankListItem {
                label: &bank.display_name,
                index,
            })
            .collect();
        serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64> {
    let trimmed = value.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f as i64)
        })
        .ok_or_else(|| {
            debug!("Rejecting {}={:?}", key, value);
            Error::invalid_value(key, value)
        })
}

fn parse_float(key: &str, value: &str) -> Result<f32> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|f| !f.is_nan())
        .ok_or_else(|| Error::invalid_value(key, value))
}

/// Menu layout: patches at the root with octave/gain knobs, and a bank chooser.
fn ui_hierarchy() -> String {
    json!({
        "modes": null,
        "levels": {
            "root": {
                "label": "SF2",
                "list_param": "preset",
                "count_param": "preset_count",
                "name_param": "preset_name",
                "children": null,
                "knobs": ["octave_transpose", "gain"],
                "params": [
                    { "key": "octave_transpose", "label": "Octave" },
                    { "key": "gain", "label": "Gain" },
                    { "level": "soundfont", "label": "Choose Soundfont" }
                ]
            },
            "soundfont": {
                "label": "Soundfont",
                "items_param": "soundfont_list",
                "select_param": "soundfont_index",
                "children": null,
                "knobs": [],
                "params": []
            }
        }
    })
    .to_string()
}
