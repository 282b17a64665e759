//! Active bank and patch selection.
//!
//! The selector owns the instance's synthesis backend, the bank catalog, the
//! patch list of the loaded bank, and the per-note pitch snapshots. Anything that
//! silences voices goes through here so the snapshots never outlive the voices.

use soundbank_synth::{BankHandle, SynthBackend, VoiceTracker};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::BankEntry;

/// Maximum number of patches kept per bank.
pub const MAX_PATCHES: usize = 1024;

/// Bank name reported before anything was loaded.
pub const NO_BANK_NAME: &str = "No SF2 loaded";

/// Bank name reported after a failed load.
pub const LOAD_FAILED_NAME: &str = "Load failed";

/// One playable program inside the loaded bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    pub name: String,
    pub bank_number: i32,
    pub program_number: i32,
}

#[derive(Debug)]
struct ActiveBank {
    handle: BankHandle,
    path: PathBuf,
    /// Position in the catalog, if the file is part of it.
    index: Option<usize>,
}

/// Bank/patch state of one instance.
pub struct BankSelector {
    backend: Box<dyn SynthBackend>,
    banks: Vec<BankEntry>,
    /// Catalog position relative navigation starts from. Survives failed loads.
    cursor: usize,
    active: Option<ActiveBank>,
    bank_name: String,
    patches: Vec<PatchEntry>,
    active_patch: usize,
    last_error: Option<String>,
    voices: VoiceTracker,
}

impl BankSelector {
    pub fn new(backend: Box<dyn SynthBackend>) -> Self {
        Self {
            backend,
            banks: Vec::new(),
            cursor: 0,
            active: None,
            bank_name: NO_BANK_NAME.to_string(),
            patches: Vec::new(),
            active_patch: 0,
            last_error: None,
            voices: VoiceTracker::new(),
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Replace the catalog. The loaded bank keeps its identity: its index is
    /// re-resolved by path.
    pub fn set_catalog(&mut self, banks: Vec<BankEntry>) {
        self.banks = banks;

        if let Some(active) = self.active.as_mut() {
            active.index = self.banks.iter().position(|b| b.path == active.path);
        }

        self.cursor = match self.active.as_ref().and_then(|a| a.index) {
            Some(index) => index,
            None => self.cursor.min(self.banks.len().saturating_sub(1)),
        };
    }

    pub fn banks(&self) -> &[BankEntry] {
        &self.banks
    }

    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    /// Exact display-name lookup.
    pub fn find_bank_by_display_name(&self, name: &str) -> Option<usize> {
        self.banks.iter().position(|b| b.display_name == name)
    }

    /// Catalog entry for a path hint: an exact path, or a file name.
    pub fn find_bank_by_path_hint(&self, hint: &Path) -> Option<usize> {
        let file_name = hint.file_name();
        self.banks.iter().position(|b| {
            b.path == hint || (file_name.is_some() && b.path.file_name() == file_name)
        })
    }

    // ========================================================================
    // Bank switching
    // ========================================================================

    /// Release the current bank and load `path`.
    ///
    /// The previous bank is released before loading, so a failure leaves the
    /// instance with no bank at all.
    pub fn load_bank(&mut self, path: &Path) -> soundbank_synth::Result<BankHandle> {
        self.release_active();

        info!("Loading bank: {}", path.display());
        let handle = match self.backend.load_bank(path) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to load bank {}: {}", path.display(), e);
                self.bank_name = LOAD_FAILED_NAME.to_string();
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.last_error = None;
        self.patches = match self.backend.patches(handle) {
            Ok(patches) => patches
                .into_iter()
                .take(MAX_PATCHES)
                .enumerate()
                .map(|(i, patch)| PatchEntry {
                    name: if patch.name.is_empty() {
                        format!("Preset {}", i)
                    } else {
                        patch.name
                    },
                    bank_number: patch.bank,
                    program_number: patch.program,
                })
                .collect(),
            Err(e) => {
                warn!("Could not enumerate patches of {}: {}", path.display(), e);
                Vec::new()
            }
        };

        let index = self.find_bank_by_path_hint(path);
        if let Some(index) = index {
            self.cursor = index;
        }
        self.bank_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.active = Some(ActiveBank {
            handle,
            path: path.to_path_buf(),
            index,
        });

        info!("Bank loaded: {} ({} patches)", self.bank_name, self.patches.len());

        if let Some(first) = self.patches.first() {
            self.backend
                .select_program(first.bank_number, first.program_number);
        }
        Ok(handle)
    }

    /// Select a catalog entry. Indices wrap in both directions.
    pub fn select_bank_by_index(&mut self, index: i64) -> soundbank_synth::Result<()> {
        let Some(index) = wrap(index, self.banks.len()) else {
            debug!("No banks in catalog, ignoring bank selection");
            return Ok(());
        };

        self.cursor = index;
        let path = self.banks[index].path.clone();
        self.load_bank(&path)?;
        if let Some(active) = self.active.as_mut() {
            active.index = Some(index);
        }
        Ok(())
    }

    pub fn next_bank(&mut self) -> soundbank_synth::Result<()> {
        self.select_bank_by_index(self.cursor as i64 + 1)
    }

    pub fn prev_bank(&mut self) -> soundbank_synth::Result<()> {
        self.select_bank_by_index(self.cursor as i64 - 1)
    }

    fn release_active(&mut self) {
        self.voices.clear();
        self.patches.clear();
        self.active_patch = 0;
        if let Some(active) = self.active.take() {
            self.backend.unload_bank(active.handle);
        }
    }

    // ========================================================================
    // Patch switching
    // ========================================================================

    /// Select a patch. Indices wrap in both directions.
    ///
    /// Switching to a different patch releases every sounding voice first. The
    /// program is (re)selected on the backend either way.
    pub fn select_patch(&mut self, index: i64) {
        let Some(index) = wrap(index, self.patches.len()) else {
            return;
        };

        if index != self.active_patch {
            self.all_voices_off(false);
        }
        self.active_patch = index;

        let patch = &self.patches[index];
        self.backend
            .select_program(patch.bank_number, patch.program_number);
        info!(
            "Preset {}: {} (bank {}, prog {})",
            index, patch.name, patch.bank_number, patch.program_number
        );
    }

    // ========================================================================
    // Voices
    // ========================================================================

    /// Trigger `pitch` on behalf of incoming note `source`.
    pub fn note_on(&mut self, source: u8, pitch: u8, velocity: f32) {
        if self.active.is_none() {
            return;
        }
        if let Some(previous) = self.voices.note_on(source, pitch) {
            self.backend.release_voice(previous);
        }
        self.backend.trigger_voice(pitch, velocity);
    }

    /// Release the voice `source` triggered, or `fallback` if it has none.
    pub fn note_off(&mut self, source: u8, fallback: u8) {
        let pitch = self.voices.note_off(source).unwrap_or(fallback);
        self.backend.release_voice(pitch);
    }

    /// Pitch `source` is currently sounding at.
    pub fn sounding_pitch(&self, source: u8) -> Option<u8> {
        self.voices.sounding_pitch(source)
    }

    pub fn all_voices_off(&mut self, immediate: bool) {
        self.voices.clear();
        self.backend.release_all(immediate);
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.active_count()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn backend(&self) -> &dyn SynthBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn SynthBackend {
        self.backend.as_mut()
    }

    pub fn is_loaded(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<BankHandle> {
        self.active.as_ref().map(|a| a.handle)
    }

    /// Catalog index of the loaded bank.
    pub fn active_bank_index(&self) -> Option<usize> {
        self.active.as_ref().and_then(|a| a.index)
    }

    pub fn active_bank_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// Display name of the loaded bank, or the empty string.
    pub fn active_bank_display_name(&self) -> &str {
        self.active_bank_index()
            .map(|i| self.banks[i].display_name.as_str())
            .unwrap_or("")
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn patches(&self) -> &[PatchEntry] {
        &self.patches
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    pub fn active_patch_index(&self) -> usize {
        self.active_patch
    }

    pub fn active_patch(&self) -> Option<&PatchEntry> {
        self.patches.get(self.active_patch)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Render through the backend, or write silence when no bank is loaded.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        if self.active.is_some() {
            self.backend.render(left, right);
        } else {
            left.fill(0.0);
            right.fill(0.0);
        }
    }
}

impl Drop for BankSelector {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            self.backend.unload_bank(active.handle);
        }
    }
}

fn wrap(index: i64, len: usize) -> Option<usize> {
    (len > 0).then(|| index.rem_euclid(len as i64) as usize)
}
