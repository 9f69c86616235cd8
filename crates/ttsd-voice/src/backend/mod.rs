//! Speech engine backends: concrete [`ModelLoader`] / [`SpeechModel`] impls.
//!
//! The controller only sees the ports from `ttsd-core`, so engines can be
//! swapped without touching the protocol logic.
//!
//! ## Backend implementations
//!
//! | Feature  | Module     | Engine                          |
//! |----------|------------|---------------------------------|
//! | `sherpa` | [`sherpa`] | Kokoro via sherpa-onnx          |
//!
//! Without any backend feature, [`default_loader`] returns a loader that
//! always fails, so the binary still starts and reports the problem as a
//! model load failure.

#[cfg(feature = "sherpa")]
pub mod sherpa;

use std::path::PathBuf;
use std::sync::Arc;

use ttsd_core::{ModelError, ModelLoader, SpeechModel};

/// Voice used when none is configured.
pub const DEFAULT_VOICE: &str = "af_sarah";

// ── Shared types ───────────────────────────────────────────────────

/// Information about an available TTS voice.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Voice identifier (used in the `VOICE` argument).
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Language/accent category.
    pub category: String,

    /// Gender.
    pub gender: VoiceGender,
}

/// Voice gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceGender {
    Female,
    Male,
}

/// Engine settings shared by every backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Directory that bare model ids are resolved against.
    pub models_dir: PathBuf,

    /// Speaking-rate multiplier (0.5–2.0, default 1.0).
    pub speed: f32,
}

impl BackendConfig {
    pub const MIN_SPEED: f32 = 0.5;
    pub const MAX_SPEED: f32 = 2.0;

    /// Build a config, clamping `speed` into the supported range.
    #[must_use]
    pub fn new(models_dir: PathBuf, speed: f32) -> Self {
        let speed = if speed.is_finite() {
            speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
        } else {
            1.0
        };
        Self { models_dir, speed }
    }
}

// ── Backend selection ──────────────────────────────────────────────

/// The loader for the backend compiled into this build.
#[must_use]
pub fn default_loader(config: BackendConfig) -> Arc<dyn ModelLoader> {
    #[cfg(feature = "sherpa")]
    {
        Arc::new(sherpa::SherpaKokoroLoader::new(config))
    }
    #[cfg(not(feature = "sherpa"))]
    {
        let _ = config;
        Arc::new(UnavailableLoader)
    }
}

/// Voices offered by the backend compiled into this build.
#[must_use]
pub fn available_voices() -> Vec<VoiceInfo> {
    #[cfg(feature = "sherpa")]
    {
        sherpa::sherpa_kokoro_voices()
    }
    #[cfg(not(feature = "sherpa"))]
    {
        Vec::new()
    }
}

/// Loader used when no engine feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLoader;

#[async_trait::async_trait]
impl ModelLoader for UnavailableLoader {
    async fn load(&self, _model_id: &str) -> Result<Arc<dyn SpeechModel>, ModelError> {
        Err(ModelError::Unavailable(
            "ttsd was built without a speech engine (enable the `sherpa` feature)".to_string(),
        ))
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Convenience constructor for [`VoiceInfo`].
#[allow(dead_code)] // only the sherpa backend has a catalogue
pub(crate) fn voice_info(id: &str, name: &str, category: &str, gender: VoiceGender) -> VoiceInfo {
    VoiceInfo {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        gender,
    }
}
