//! Single-instance host adapter.
//!
//! Hosts that only ever run one instrument get the same [`Instance`] without
//! going through ids. There is no global state: the adapter is a value the host
//! keeps for as long as the module is loaded.

use soundbank_synth::SynthBackend;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use crate::config::{HostConfig, InstanceDefaults};
use crate::instance::Instance;
use crate::Result;

pub struct SingleInstance {
    instance: Instance,
}

impl SingleInstance {
    /// Load the module with the SoundFont engine.
    #[cfg(feature = "soundfont")]
    pub fn load(
        module_dir: impl Into<PathBuf>,
        defaults: Option<&str>,
        config: HostConfig,
    ) -> Result<Self> {
        let backend = soundbank_synth::SoundFontBackend::new(config.soundfont_config())?;
        Self::with_backend(module_dir, defaults, config, Box::new(backend))
    }

    pub fn with_backend(
        module_dir: impl Into<PathBuf>,
        defaults: Option<&str>,
        config: HostConfig,
        backend: Box<dyn SynthBackend>,
    ) -> Result<Self> {
        config.validate()?;
        let defaults = InstanceDefaults::parse(defaults);
        Ok(Self {
            instance: Instance::new(module_dir, &defaults, &config, backend),
        })
    }

    pub fn into_inner(self) -> Instance {
        self.instance
    }
}

impl Deref for SingleInstance {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        &self.instance
    }
}

impl DerefMut for SingleInstance {
    fn deref_mut(&mut self) -> &mut Instance {
        &mut self.instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use soundbank_synth::MockBackend;

    #[test]
    fn test_adapter_exposes_instance() {
        let dir = tempfile::tempdir().unwrap();
        let bank_dir = catalog::bank_dir(dir.path());
        std::fs::create_dir_all(&bank_dir).unwrap();
        MockBackend::write_bank_file(bank_dir.join("a.sf2"), &["Piano"]).unwrap();

        let probe = MockBackend::default();
        let mut single = SingleInstance::with_backend(
            dir.path(),
            Some(r#"{"octave_transpose":1}"#),
            HostConfig::default(),
            Box::new(probe.clone()),
        )
        .unwrap();

        single.on_midi(&[0x90, 60, 100]);
        assert_eq!(probe.sounding_notes(), vec![72]);
        assert_eq!(single.get_param("soundfont_name").unwrap(), "a.sf2");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = HostConfig {
            frames_per_block: 0,
            ..HostConfig::default()
        };
        let result = SingleInstance::with_backend(
            dir.path(),
            None,
            config,
            Box::new(MockBackend::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_releases_bank() {
        let dir = tempfile::tempdir().unwrap();
        MockBackend::write_bank_file(dir.path().join(catalog::FALLBACK_BANK), &["Solo"])
            .unwrap();

        let probe = MockBackend::default();
        let single = SingleInstance::with_backend(
            dir.path(),
            None,
            HostConfig::default(),
            Box::new(probe.clone()),
        )
        .unwrap();
        let handle = probe.loaded_handle().unwrap();

        drop(single);
        assert_eq!(probe.unload_count(handle), 1);
    }
}
