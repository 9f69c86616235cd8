//! Speech model ports: the boundary to the synthesis engine.
//!
//! # Design Rules
//!
//! - No engine types (sherpa-onnx, ONNX Runtime, …) in any signature.
//! - `generate` returns a *lazy* stream: nothing is synthesized until the
//!   caller polls, and dropping the stream stops further synthesis. This is
//!   what makes interruption cheap for the controller.
//! - Implementations run CPU-bound inference off the async worker threads
//!   (e.g. `tokio::task::spawn_blocking`).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// One unit of audio produced by a single pull from a generation stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioChunk {
    /// Mono f32 samples, nominally in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
}

impl AudioChunk {
    #[must_use]
    pub const fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f32>> for AudioChunk {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

/// Lazy, finite sequence of audio chunks for one generation request.
pub type AudioStream = BoxStream<'static, Result<AudioChunk, ModelError>>;

/// Errors reported by speech model implementations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Model files are missing.
    #[error("Model not found at {0}")]
    NotFound(PathBuf),

    /// The engine refused to load the model.
    #[error("Model load failed: {0}")]
    Load(String),

    /// Inference failed for a request.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// No engine is available in this build.
    #[error("Speech backend unavailable: {0}")]
    Unavailable(String),
}

/// A loaded text-to-speech model.
///
/// Implementations must be `Send + Sync`: the model is shared behind an
/// `Arc` for the lifetime of the process.
pub trait SpeechModel: Send + Sync {
    /// Output sample rate of every chunk (Hz).
    fn sample_rate(&self) -> u32;

    /// Start synthesizing `text` with `voice`.
    ///
    /// Errors returned here mean the request could not start at all; errors
    /// yielded by the stream abort the generation part-way.
    fn generate(&self, text: &str, voice: &str) -> Result<AudioStream, ModelError>;
}

/// Loads a [`SpeechModel`] by identifier.
///
/// The identifier's meaning is engine-specific (a model directory, a
/// registry id, …).
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, ModelError>;
}
