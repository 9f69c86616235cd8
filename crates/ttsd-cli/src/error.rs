//! CLI-specific error types and exit-code mapping.

use thiserror::Error;
use ttsd_voice::VoiceError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The speech model could not be loaded or used.
    #[error("{0}")]
    Model(String),

    /// Argument validation error (clap reports parse errors itself).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (broken output stream, unwritable file, ...).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to a process exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error (model failed to load)
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Model(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Io(_) => 74,       // EX_IOERR
            Self::Config(_) => 78,   // EX_CONFIG
        }
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::ModelLoad(_) | VoiceError::NotReady(_) => Self::Model(err.to_string()),
            VoiceError::Output(_) => Self::Io(err.to_string()),
            VoiceError::NoModelsDir => Self::Config(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error returned from a handler.
///
/// Errors that are not a [`CliError`] anywhere in their chain map to 1.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}
