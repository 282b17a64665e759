//! Error types for soundbank-synth.

use std::path::PathBuf;
use thiserror::Error;

use crate::BankHandle;

/// Result type alias for soundbank-synth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in soundbank-synth.
#[derive(Debug, Error)]
pub enum Error {
    /// The bank file could not be read or parsed.
    #[error("failed to load soundfont '{}': {reason}", path.display())]
    BankLoad { path: PathBuf, reason: String },

    /// The handle does not refer to the bank currently loaded by this backend.
    #[error("unknown bank handle {0:?}")]
    UnknownHandle(BankHandle),

    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn bank_load(path: &std::path::Path, reason: impl ToString) -> Self {
        Error::BankLoad {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
