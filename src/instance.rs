//! One synthesizer instance.

use soundbank_midi::{MidiEvent, RawMidiEvent};
use soundbank_synth::SynthBackend;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::{self, BankEntry, FALLBACK_BANK};
use crate::config::{HostConfig, InstanceDefaults};
use crate::render::RenderBridge;
use crate::selector::BankSelector;
use crate::translator;

/// Octave transpose range.
pub const MIN_OCTAVE_TRANSPOSE: i8 = -4;
pub const MAX_OCTAVE_TRANSPOSE: i8 = 4;

/// Output gain range.
pub const MIN_GAIN: f32 = 0.0;
pub const MAX_GAIN: f32 = 2.0;

/// Independent instrument state: bank, patch, transpose and gain, plus the
/// synthesis backend it exclusively owns.
///
/// Not internally synchronized. The host must not render while a parameter or
/// MIDI call is running on the same instance.
pub struct Instance {
    module_dir: PathBuf,
    selector: BankSelector,
    bridge: RenderBridge,
    octave_transpose: i8,
    gain: f32,
}

impl Instance {
    /// Create an instance for `module_dir` and load its default bank.
    ///
    /// A bank that fails to load leaves the instance silent with the failure in
    /// [`Instance::last_error`]; creation itself never fails.
    pub fn new(
        module_dir: impl Into<PathBuf>,
        defaults: &InstanceDefaults,
        config: &HostConfig,
        backend: Box<dyn SynthBackend>,
    ) -> Self {
        let mut instance = Self {
            module_dir: module_dir.into(),
            selector: BankSelector::new(backend),
            bridge: RenderBridge::new(config.frames_per_block),
            octave_transpose: 0,
            gain: 1.0,
        };

        instance.rescan_catalog();
        instance.load_default_bank(defaults.soundfont_path.as_deref());

        if let Some(octaves) = defaults.octave_transpose {
            instance.set_octave_transpose(octaves);
        }
        if let Some(gain) = defaults.gain {
            instance.set_gain(gain);
        }

        info!(
            "Instance created: {} ({} banks, bank: {})",
            instance.module_dir.display(),
            instance.selector.bank_count(),
            instance.selector.bank_name()
        );
        instance
    }

    fn load_default_bank(&mut self, hint: Option<&Path>) {
        if self.selector.bank_count() > 0 {
            let index = hint
                .and_then(|hint| self.selector.find_bank_by_path_hint(hint))
                .unwrap_or(0);
            // Failures are recorded in last_error
            let _ = self.selector.select_bank_by_index(index as i64);
            return;
        }

        let path = hint
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.module_dir.join(FALLBACK_BANK));
        debug!("Catalog empty, falling back to {}", path.display());
        let _ = self.selector.load_bank(&path);
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Rescan the module's bank directory and replace the catalog.
    pub fn rescan_catalog(&mut self) -> &[BankEntry] {
        let banks = catalog::scan(&catalog::bank_dir(&self.module_dir));
        self.selector.set_catalog(banks);
        self.selector.banks()
    }

    // ========================================================================
    // MIDI
    // ========================================================================

    /// Handle a raw 2-3 byte message from the host. Undecodable input is dropped.
    pub fn on_midi(&mut self, bytes: &[u8]) {
        match RawMidiEvent::from_bytes(bytes).and_then(|raw| raw.decode()) {
            Ok(event) => self.handle_event(&event),
            Err(e) => debug!("Dropping MIDI message {:02X?}: {}", bytes, e),
        }
    }

    pub fn handle_event(&mut self, event: &MidiEvent) {
        translator::apply(&mut self.selector, self.octave_transpose, event);
    }

    // ========================================================================
    // Controls
    // ========================================================================

    pub fn octave_transpose(&self) -> i8 {
        self.octave_transpose
    }

    /// Set the octave transpose, clamped to [-4, 4]. Returns the applied value.
    ///
    /// Sounding notes keep their pitch and are released where they were triggered.
    pub fn set_octave_transpose(&mut self, octaves: i32) -> i8 {
        self.octave_transpose = octaves.clamp(
            MIN_OCTAVE_TRANSPOSE as i32,
            MAX_OCTAVE_TRANSPOSE as i32,
        ) as i8;
        self.octave_transpose
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Set the output gain, clamped to [0, 2]. Returns the applied value.
    ///
    /// NaN is ignored. Backends without post-gain keep the value for state only.
    pub fn set_gain(&mut self, gain: f32) -> f32 {
        if gain.is_nan() {
            warn!("Ignoring NaN gain");
            return self.gain;
        }
        self.gain = gain.clamp(MIN_GAIN, MAX_GAIN);
        self.selector.backend_mut().set_gain(self.gain);
        self.gain
    }

    pub fn supports_gain(&self) -> bool {
        self.selector.backend().supports_gain()
    }

    /// Release every voice immediately.
    pub fn panic(&mut self) {
        self.selector.all_voices_off(true);
    }

    // ========================================================================
    // Bank / patch
    // ========================================================================

    pub fn load_bank(&mut self, path: &Path) -> crate::Result<()> {
        self.selector.load_bank(path)?;
        Ok(())
    }

    pub fn select_bank_by_index(&mut self, index: i64) -> crate::Result<()> {
        self.selector.select_bank_by_index(index)?;
        Ok(())
    }

    pub fn next_bank(&mut self) -> crate::Result<()> {
        self.selector.next_bank()?;
        Ok(())
    }

    pub fn prev_bank(&mut self) -> crate::Result<()> {
        self.selector.prev_bank()?;
        Ok(())
    }

    pub fn select_patch(&mut self, index: i64) {
        self.selector.select_patch(index);
    }

    pub fn selector(&self) -> &BankSelector {
        &self.selector
    }

    pub fn last_error(&self) -> Option<&str> {
        self.selector.last_error()
    }

    // ========================================================================
    // Render
    // ========================================================================

    /// Fill `out` with interleaved stereo 16-bit samples.
    pub fn render_block(&mut self, out: &mut [i16]) {
        self.bridge.render(&mut self.selector, out);
    }

    pub fn frames_per_block(&self) -> usize {
        self.bridge.frames_per_block()
    }

    pub(crate) fn selector_mut(&mut self) -> &mut BankSelector {
        &mut self.selector
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        debug!("Instance destroyed: {}", self.module_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundbank_synth::{BackendCall, MockBackend};
    use tempfile::TempDir;

    fn module_dir(banks: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let bank_dir = catalog::bank_dir(dir.path());
        std::fs::create_dir_all(&bank_dir).unwrap();
        for name in banks {
            MockBackend::write_bank_file(bank_dir.join(name), &["One", "Two"]).unwrap();
        }
        dir
    }

    fn instance(dir: &Path, defaults: &InstanceDefaults, probe: &MockBackend) -> Instance {
        Instance::new(
            dir,
            defaults,
            &HostConfig::default(),
            Box::new(probe.clone()),
        )
    }

    #[test]
    fn test_creation_loads_first_bank() {
        let dir = module_dir(&["b.sf2", "a.sf2"]);
        let probe = MockBackend::default();
        let inst = instance(dir.path(), &InstanceDefaults::default(), &probe);

        assert_eq!(inst.selector().active_bank_index(), Some(0));
        assert_eq!(inst.selector().bank_name(), "a.sf2");
        assert_eq!(inst.octave_transpose(), 0);
        assert_eq!(inst.gain(), 1.0);
    }

    #[test]
    fn test_creation_honours_hint_by_file_name() {
        let dir = module_dir(&["a.sf2", "b.sf2"]);
        let probe = MockBackend::default();
        let defaults = InstanceDefaults {
            soundfont_path: Some(PathBuf::from("/somewhere/else/b.sf2")),
            ..Default::default()
        };
        let inst = instance(dir.path(), &defaults, &probe);
        assert_eq!(inst.selector().active_bank_index(), Some(1));
    }

    #[test]
    fn test_creation_with_unknown_hint_uses_first_entry() {
        let dir = module_dir(&["a.sf2", "b.sf2"]);
        let probe = MockBackend::default();
        let defaults = InstanceDefaults {
            soundfont_path: Some(PathBuf::from("zzz.sf2")),
            ..Default::default()
        };
        let inst = instance(dir.path(), &defaults, &probe);
        assert_eq!(inst.selector().active_bank_index(), Some(0));
    }

    #[test]
    fn test_empty_catalog_falls_back_to_module_root() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join(FALLBACK_BANK);
        MockBackend::write_bank_file(&fallback, &["Solo"]).unwrap();

        let probe = MockBackend::default();
        let inst = instance(dir.path(), &InstanceDefaults::default(), &probe);

        assert!(inst.selector().is_loaded());
        assert_eq!(inst.selector().active_bank_index(), None);
        assert_eq!(inst.selector().bank_name(), FALLBACK_BANK);
        assert_eq!(probe.calls()[0], BackendCall::LoadBank(fallback));
    }

    #[test]
    fn test_empty_catalog_uses_hint_path() {
        let dir = tempfile::tempdir().unwrap();
        let hinted = dir.path().join("custom.sf2");
        MockBackend::write_bank_file(&hinted, &["Solo"]).unwrap();

        let probe = MockBackend::default();
        let defaults = InstanceDefaults {
            soundfont_path: Some(hinted.clone()),
            ..Default::default()
        };
        let inst = instance(dir.path(), &defaults, &probe);
        assert_eq!(inst.selector().active_bank_path(), Some(hinted.as_path()));
    }

    #[test]
    fn test_nothing_to_load_is_silent_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = MockBackend::default();
        let mut inst = instance(dir.path(), &InstanceDefaults::default(), &probe);

        assert!(!inst.selector().is_loaded());
        assert!(inst.last_error().is_some());

        let mut out = vec![1i16; 64];
        inst.render_block(&mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_defaults_are_clamped() {
        let dir = module_dir(&["a.sf2"]);
        let probe = MockBackend::default();
        let defaults = InstanceDefaults {
            soundfont_path: None,
            octave_transpose: Some(9),
            gain: Some(-1.0),
        };
        let inst = instance(dir.path(), &defaults, &probe);
        assert_eq!(inst.octave_transpose(), 4);
        assert_eq!(inst.gain(), 0.0);
    }

    #[test]
    fn test_setters_clamp() {
        let dir = module_dir(&["a.sf2"]);
        let probe = MockBackend::default();
        let mut inst = instance(dir.path(), &InstanceDefaults::default(), &probe);

        assert_eq!(inst.set_octave_transpose(99), 4);
        assert_eq!(inst.set_octave_transpose(-99), -4);
        assert_eq!(inst.set_gain(5.0), 2.0);
        assert_eq!(inst.set_gain(-5.0), 0.0);
        assert_eq!(inst.set_gain(f32::NAN), 0.0);
        assert_eq!(probe.calls().last(), Some(&BackendCall::Gain(0.0)));
    }

    #[test]
    fn test_malformed_midi_is_dropped() {
        let dir = module_dir(&["a.sf2"]);
        let probe = MockBackend::default();
        let mut inst = instance(dir.path(), &InstanceDefaults::default(), &probe);
        probe.clear_calls();

        inst.on_midi(&[0x90]);
        inst.on_midi(&[0xF8, 0x00]);
        inst.on_midi(&[]);
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_panic_releases_immediately() {
        let dir = module_dir(&["a.sf2"]);
        let probe = MockBackend::default();
        let mut inst = instance(dir.path(), &InstanceDefaults::default(), &probe);

        inst.on_midi(&[0x90, 60, 100]);
        inst.on_midi(&[0x90, 64, 100]);
        inst.panic();
        assert!(probe.sounding_notes().is_empty());
        assert_eq!(
            probe.calls().last(),
            Some(&BackendCall::ReleaseAll { immediate: true })
        );
    }
}
