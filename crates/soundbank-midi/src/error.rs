//! Error types for MIDI decoding.

use thiserror::Error;

/// Result type alias for soundbank-midi operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI message too short: {0} byte(s)")]
    TooShort(usize),

    #[error("Unsupported MIDI status byte: {0:#04x}")]
    UnsupportedStatus(u8),

    #[error("MIDI parse error: {0}")]
    Parse(String),
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::Parse(e.to_string())
    }
}
