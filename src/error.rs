//! Centralized error type for the soundbank umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

use crate::InstanceId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI: {0}")]
    Midi(#[from] soundbank_midi::Error),

    #[error("Synth: {0}")]
    Synth(#[from] soundbank_synth::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid value '{value}' for parameter '{key}'")]
    InvalidParameterValue { key: String, value: String },

    #[error("Unknown instance {0:?}")]
    UnknownInstance(InstanceId),
}

impl Error {
    pub(crate) fn invalid_value(key: &str, value: &str) -> Self {
        Error::InvalidParameterValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
