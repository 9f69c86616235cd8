//! Sidecar runtime error types.

use ttsd_core::{FrameError, ModelError};

/// Errors that can end the sidecar runtime.
///
/// Per-command and per-generation failures never surface here: they are
/// reported on the diagnostic channel and the controller keeps running.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The speech model could not be loaded at startup.
    #[error("Failed to load model: {0}")]
    ModelLoad(#[source] ModelError),

    /// Writing to the audio output stream failed.
    #[error("Audio output failed: {0}")]
    Output(#[from] FrameError),

    /// The controller was asked to serve before startup completed.
    #[error("Generation controller is not ready (state: {0})")]
    NotReady(&'static str),

    /// No usable models directory could be determined.
    #[error("Could not determine a models directory; set TTSD_MODELS_DIR")]
    NoModelsDir,
}
