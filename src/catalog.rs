//! Sound-bank discovery.
//!
//! A module directory holds its banks in a `soundfonts/` subdirectory. Scans are
//! side-effect free and never fail: an unreadable directory is an empty catalog.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Subdirectory of the module directory that holds bank files.
pub const BANK_DIR: &str = "soundfonts";

/// Bank loaded from the module root when the catalog is empty and no hint is given.
pub const FALLBACK_BANK: &str = "instrument.sf2";

/// Maximum number of entries kept per scan.
pub const MAX_BANKS: usize = 64;

const BANK_EXTENSION: &str = "sf2";

/// One discoverable bank file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankEntry {
    pub path: PathBuf,
    pub display_name: String,
}

impl BankEntry {
    /// `None` only for paths without a file name. Names that are not valid
    /// UTF-8 are displayed lossily.
    pub fn new(path: PathBuf) -> Option<Self> {
        let display_name = path.file_name()?.to_string_lossy().into_owned();
        Some(Self { path, display_name })
    }
}

/// Directory scanned for `module_dir`.
pub fn bank_dir(module_dir: &Path) -> PathBuf {
    module_dir.join(BANK_DIR)
}

/// List the bank files in `dir`, ordered by display name (case-insensitive).
///
/// Hidden entries and anything without a `.sf2` extension are skipped. Entries
/// with equal keys keep their enumeration order.
pub fn scan(dir: &Path) -> Vec<BankEntry> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            debug!("No bank directory at {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut keyed: Vec<(String, BankEntry)> = read_dir
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_bank_file(path))
        .filter_map(BankEntry::new)
        .map(|entry| (entry.display_name.to_lowercase(), entry))
        .collect();

    // `sort_by` is stable, ties keep enumeration order.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    if keyed.len() > MAX_BANKS {
        warn!(
            "Bank list full, skipping {} extra file(s) in {}",
            keyed.len() - MAX_BANKS,
            dir.display()
        );
        keyed.truncate(MAX_BANKS);
    }

    let entries: Vec<BankEntry> = keyed.into_iter().map(|(_, entry)| entry).collect();
    debug!("Scanned {}: {} bank(s)", dir.display(), entries.len());
    entries
}

fn is_bank_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .map_or(true, |name| name.as_encoded_bytes().starts_with(b"."));
    let extension_matches = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(BANK_EXTENSION));

    !hidden && extension_matches && path.is_file()
}
