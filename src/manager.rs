//! Multi-instance lifecycle.
//!
//! The host creates instances from a module directory and a default-config blob,
//! then addresses them by [`InstanceId`]. Instances share nothing: each owns its
//! own backend and bank handle.

use soundbank_synth::SynthBackend;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::{HostConfig, InstanceDefaults};
use crate::instance::Instance;
use crate::{Error, Result};

/// Creates a fresh backend for each new instance.
pub type BackendFactory =
    Box<dyn Fn(&HostConfig) -> soundbank_synth::Result<Box<dyn SynthBackend>> + Send + Sync>;

/// Opaque handle to a live instance. Never reused within one manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Owns every instance created by the host.
pub struct InstanceManager {
    config: HostConfig,
    factory: BackendFactory,
    instances: HashMap<InstanceId, Instance>,
    next_id: u64,
}

impl InstanceManager {
    pub fn builder() -> InstanceManagerBuilder {
        InstanceManagerBuilder::default()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Create an instance and load its default bank.
    ///
    /// A bank that fails to load does not fail creation (the instance is silent
    /// and reports the error). Only a backend that cannot be constructed does.
    pub fn create_instance(
        &mut self,
        module_dir: impl Into<PathBuf>,
        defaults: Option<&str>,
    ) -> Result<InstanceId> {
        let backend = (self.factory)(&self.config)?;
        let defaults = InstanceDefaults::parse(defaults);
        let instance = Instance::new(module_dir, &defaults, &self.config, backend);

        let id = InstanceId(self.next_id);
        self.next_id += 1;
        self.instances.insert(id, instance);
        info!("Created instance {} ({} live)", id.0, self.instances.len());
        Ok(id)
    }

    /// Destroy an instance, releasing its bank. Returns false for unknown ids.
    pub fn destroy_instance(&mut self, id: InstanceId) -> bool {
        let removed = self.instances.remove(&id).is_some();
        if removed {
            info!("Destroyed instance {} ({} live)", id.0, self.instances.len());
        } else {
            debug!("Destroy of unknown instance {}", id.0);
        }
        removed
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut Instance> {
        self.instances.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    // ========================================================================
    // Host entry points
    // ========================================================================

    /// Unknown ids are ignored.
    pub fn on_midi(&mut self, id: InstanceId, bytes: &[u8]) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.on_midi(bytes);
        }
    }

    pub fn set_param(&mut self, id: InstanceId, key: &str, value: &str) -> Result<()> {
        self.get_mut(id)?.set_param(key, value)
    }

    pub fn get_param(&mut self, id: InstanceId, key: &str) -> Result<String> {
        self.get_mut(id)?.get_param(key)
    }

    /// Last bank load error of the instance, if any.
    pub fn get_error(&self, id: InstanceId) -> Option<String> {
        self.instances
            .get(&id)
            .and_then(|i| i.last_error())
            .map(str::to_string)
    }

    /// Render one block. Unknown ids produce silence.
    pub fn render_block(&mut self, id: InstanceId, out: &mut [i16]) {
        match self.instances.get_mut(&id) {
            Some(instance) => instance.render_block(out),
            None => out.fill(0),
        }
    }

    fn get_mut(&mut self, id: InstanceId) -> Result<&mut Instance> {
        self.instances
            .get_mut(&id)
            .ok_or(Error::UnknownInstance(id))
    }
}

/// Builder for [`InstanceManager`].
///
/// # Example
///
/// ```ignore
/// use soundbank::InstanceManager;
///
/// let mut manager = InstanceManager::builder()
///     .sample_rate(48000)
///     .frames_per_block(128)
///     .build()?;
///
/// let id = manager.create_instance("/opt/modules/sf2", None)?;
/// manager.on_midi(id, &[0x90, 60, 100]);
/// ```
#[derive(Default)]
pub struct InstanceManagerBuilder {
    config: HostConfig,
    factory: Option<BackendFactory>,
}

impl InstanceManagerBuilder {
    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 128
    pub fn frames_per_block(mut self, frames: usize) -> Self {
        self.config.frames_per_block = frames;
        self
    }

    /// Default: 64
    pub fn polyphony(mut self, voices: usize) -> Self {
        self.config.polyphony = voices;
        self
    }

    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom synthesis backend instead of the SoundFont engine.
    pub fn backend_factory(mut self, factory: BackendFactory) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<InstanceManager> {
        self.config.validate()?;

        let factory = match self.factory {
            Some(factory) => factory,
            None => default_factory()?,
        };

        Ok(InstanceManager {
            config: self.config,
            factory,
            instances: HashMap::new(),
            next_id: 1,
        })
    }
}

#[cfg(feature = "soundfont")]
fn default_factory() -> Result<BackendFactory> {
    Ok(Box::new(|config: &HostConfig| {
        let backend = soundbank_synth::SoundFontBackend::new(config.soundfont_config())?;
        Ok(Box::new(backend) as Box<dyn SynthBackend>)
    }))
}

#[cfg(not(feature = "soundfont"))]
fn default_factory() -> Result<BackendFactory> {
    tracing::warn!("Built without the soundfont feature and no backend factory given");
    Err(Error::InvalidConfig(
        "no synthesis backend available".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use parking_lot::Mutex;
    use soundbank_synth::MockBackend;
    use std::sync::Arc;

    /// Factory handing out mocks and keeping a probe clone of each.
    fn mock_factory() -> (BackendFactory, Arc<Mutex<Vec<MockBackend>>>) {
        let probes = Arc::new(Mutex::new(Vec::new()));
        let shared = probes.clone();
        let factory: BackendFactory = Box::new(move |config: &HostConfig| {
            let backend = MockBackend::new(config.sample_rate);
            shared.lock().push(backend.clone());
            Ok(Box::new(backend) as Box<dyn SynthBackend>)
        });
        (factory, probes)
    }

    fn module_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let bank_dir = catalog::bank_dir(dir.path());
        std::fs::create_dir_all(&bank_dir).unwrap();
        MockBackend::write_bank_file(bank_dir.join("a.sf2"), &["Piano", "Organ"]).unwrap();
        MockBackend::write_bank_file(bank_dir.join("b.sf2"), &["Strings"]).unwrap();
        dir
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let (factory, _) = mock_factory();
        let result = InstanceManager::builder()
            .sample_rate(100)
            .backend_factory(factory)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_config() {
        let (factory, _) = mock_factory();
        let manager = InstanceManager::builder()
            .sample_rate(48000)
            .frames_per_block(256)
            .polyphony(32)
            .backend_factory(factory)
            .build()
            .unwrap();
        assert_eq!(manager.config().sample_rate, 48000);
        assert_eq!(manager.config().frames_per_block, 256);
        assert_eq!(manager.config().polyphony, 32);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_instances_are_isolated() {
        let dir = module_dir();
        let (factory, probes) = mock_factory();
        let mut manager = InstanceManager::builder()
            .backend_factory(factory)
            .build()
            .unwrap();

        let first = manager.create_instance(dir.path(), None).unwrap();
        let second = manager
            .create_instance(dir.path(), Some(r#"{"soundfont_path":"b.sf2"}"#))
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.len(), 2);

        manager.set_param(first, "preset", "1").unwrap();
        manager.on_midi(first, &[0x90, 60, 100]);

        assert_eq!(manager.get_param(first, "preset_name").unwrap(), "Organ");
        assert_eq!(manager.get_param(second, "preset_name").unwrap(), "Strings");

        let probes = probes.lock();
        assert_eq!(probes[0].sounding_notes(), vec![60]);
        assert!(probes[1].sounding_notes().is_empty());
        assert_ne!(probes[0].loaded_handle(), probes[1].loaded_handle());
    }

    #[test]
    fn test_destroy_releases_handle_once() {
        let dir = module_dir();
        let (factory, probes) = mock_factory();
        let mut manager = InstanceManager::builder()
            .backend_factory(factory)
            .build()
            .unwrap();

        let id = manager.create_instance(dir.path(), None).unwrap();
        let probe = probes.lock()[0].clone();
        let handle = probe.loaded_handle().unwrap();

        assert!(manager.destroy_instance(id));
        assert!(!manager.destroy_instance(id));
        assert_eq!(probe.unload_count(handle), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_unknown_instance() {
        let (factory, _) = mock_factory();
        let mut manager = InstanceManager::builder()
            .backend_factory(factory)
            .build()
            .unwrap();
        let ghost = InstanceId(42);

        assert!(matches!(
            manager.set_param(ghost, "preset", "1"),
            Err(Error::UnknownInstance(_))
        ));
        assert!(manager.get_param(ghost, "preset").is_err());
        assert_eq!(manager.get_error(ghost), None);
        manager.on_midi(ghost, &[0x90, 60, 100]);

        let mut out = vec![7i16; 32];
        manager.render_block(ghost, &mut out);
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_get_error() {
        let dir = tempfile::tempdir().unwrap();
        let (factory, _) = mock_factory();
        let mut manager = InstanceManager::builder()
            .backend_factory(factory)
            .build()
            .unwrap();

        // No catalog and no instrument.sf2
        let id = manager.create_instance(dir.path(), None).unwrap();
        assert!(manager.get_error(id).unwrap().contains("instrument.sf2"));
        assert_eq!(manager.get_param(id, "soundfont_name").unwrap(), "Load failed");
    }

    #[test]
    fn test_factory_failure_fails_creation() {
        let factory: BackendFactory = Box::new(|_: &HostConfig| {
            Err(soundbank_synth::Error::InvalidConfig("offline".to_string()))
        });
        let mut manager = InstanceManager::builder()
            .backend_factory(factory)
            .build()
            .unwrap();
        assert!(matches!(
            manager.create_instance("/nowhere", None),
            Err(Error::Synth(_))
        ));
        assert!(manager.is_empty());
    }
}
