//! Test fixtures for soundbank integration tests.
//!
//! Module directories are built in a temp dir with mock bank files, and every
//! instance gets a [`MockBackend`] whose clone stays behind as a probe.

#![allow(dead_code)]

use soundbank::synth::MockBackend;
use soundbank::{catalog, HostConfig, Instance, InstanceDefaults};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Frames per block used by the fixtures.
pub const TEST_BLOCK: usize = 64;

/// A module directory and the instance created from it.
pub struct Fixture {
    pub dir: TempDir,
    pub probe: MockBackend,
    pub instance: Instance,
}

impl Fixture {
    pub fn bank_path(&self, name: &str) -> PathBuf {
        catalog::bank_dir(self.dir.path()).join(name)
    }

    /// Add a bank file to the module's catalog directory (no rescan).
    pub fn add_bank(&self, name: &str, patches: &[&str]) {
        MockBackend::write_bank_file(self.bank_path(name), patches)
            .expect("Failed to write bank file");
    }

    pub fn remove_bank(&self, name: &str) {
        std::fs::remove_file(self.bank_path(name)).expect("Failed to remove bank file");
    }

    pub fn get(&mut self, key: &str) -> String {
        self.instance
            .get_param(key)
            .unwrap_or_else(|e| panic!("get_param({}) failed: {}", key, e))
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.instance
            .set_param(key, value)
            .unwrap_or_else(|e| panic!("set_param({}, {}) failed: {}", key, value, e));
    }

    pub fn render(&mut self) -> Vec<i16> {
        let mut out = vec![0i16; 2 * TEST_BLOCK];
        self.instance.render_block(&mut out);
        out
    }
}

/// Create a module directory holding `banks` (name, patch names).
pub fn module_dir(banks: &[(&str, &[&str])]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let bank_dir = catalog::bank_dir(dir.path());
    std::fs::create_dir_all(&bank_dir).expect("Failed to create bank dir");
    for (name, patches) in banks {
        MockBackend::write_bank_file(bank_dir.join(name), patches)
            .expect("Failed to write bank file");
    }
    dir
}

pub fn host_config() -> HostConfig {
    HostConfig {
        frames_per_block: TEST_BLOCK,
        ..HostConfig::default()
    }
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn fixture_with(
    banks: &[(&str, &[&str])],
    probe: MockBackend,
    defaults: Option<&str>,
) -> Fixture {
    init_tracing();
    let dir = module_dir(banks);
    let instance = Instance::new(
        dir.path(),
        &InstanceDefaults::parse(defaults),
        &host_config(),
        Box::new(probe.clone()),
    );
    Fixture {
        dir,
        probe,
        instance,
    }
}

pub fn fixture(banks: &[(&str, &[&str])]) -> Fixture {
    fixture_with(banks, MockBackend::default(), None)
}

/// Three banks with 3, 2 and 4 patches.
pub fn standard_fixture() -> Fixture {
    fixture(&[
        ("Alpha.sf2", &["Piano", "E.Piano", "Harpsichord"]),
        ("beta.sf2", &["Strings", "Choir"]),
        ("Gamma.sf2", &["Kit", "Brush", "Room", "Power"]),
    ])
}

/// Real SoundFont fixture, absent in most checkouts.
pub fn soundfont_fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/soundfonts/TimGM6mb.sf2")
}

pub fn exists_or_skip(path: &Path) -> bool {
    if path.exists() {
        true
    } else {
        eprintln!("Skipping test: SoundFont not found at {:?}", path);
        false
    }
}

pub fn is_silent(samples: &[i16]) -> bool {
    samples.iter().all(|&s| s == 0)
}
