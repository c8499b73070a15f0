//! Error types shared by the translation core and the port adapter.

use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// `Config` and `PortNotFound` are fatal at startup. `OutOfRange` only ever
/// drops the offending event. `PortWrite` is recoverable: tracker state is
/// left as it was and translation resumes once the port accepts data again.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{direction} port '{pattern}' not found")]
    PortNotFound {
        direction: &'static str,
        pattern: String,
    },

    #[error("{field} {value} out of range (must be 0-127)")]
    OutOfRange { field: &'static str, value: u8 },

    #[error("failed to write to output port: {0}")]
    PortWrite(String),

    #[error("MIDI backend error: {0}")]
    Midi(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<midir::InitError> for Error {
    fn from(err: midir::InitError) -> Self {
        Error::Midi(err.to_string())
    }
}

impl From<midir::SendError> for Error {
    fn from(err: midir::SendError) -> Self {
        Error::PortWrite(err.to_string())
    }
}
