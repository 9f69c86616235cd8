//! Sherpa-ONNX Kokoro backend: implements the model ports via `sherpa-rs`.
//!
//! `KokoroTts::create` takes `&mut self` and blocks for the whole inference,
//! so the engine lives behind an `Arc<Mutex<…>>` and every call runs on the
//! blocking thread pool. Requests are cut into sentence-sized segments and
//! each segment is synthesized only when the controller pulls the next chunk.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use sherpa_rs::tts::{KokoroTts, KokoroTtsConfig};
use tracing::{debug, info, warn};

use ttsd_core::{AudioChunk, AudioStream, ModelError, ModelLoader, SpeechModel};

use crate::backend::{BackendConfig, VoiceGender, VoiceInfo, voice_info};
use crate::models::resolve_model_dir;
use crate::segment::segment_text;

/// Sherpa-ONNX Kokoro output sample rate (24 kHz).
pub const SHERPA_TTS_SAMPLE_RATE: u32 = 24_000;

/// Files every Kokoro model directory must contain.
const REQUIRED_FILES: [&str; 3] = ["model.onnx", "voices.bin", "tokens.txt"];

/// espeak-ng data shipped alongside the model.
const ESPEAK_DATA_DIR: &str = "espeak-ng-data";

// ── Loader ─────────────────────────────────────────────────────────

/// Loads Kokoro model directories from disk.
#[derive(Debug, Clone)]
pub struct SherpaKokoroLoader {
    config: BackendConfig,
}

impl SherpaKokoroLoader {
    #[must_use]
    pub const fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for SherpaKokoroLoader {
    async fn load(&self, model_id: &str) -> Result<Arc<dyn SpeechModel>, ModelError> {
        let model_dir = resolve_model_dir(model_id, &self.config.models_dir);
        let kokoro_config = kokoro_config(&model_dir, self.config.speed)?;

        info!(
            dir = %model_dir.display(),
            speed = self.config.speed,
            "Loading Sherpa Kokoro model"
        );

        let engine = tokio::task::spawn_blocking(move || KokoroTts::new(kokoro_config))
            .await
            .map_err(|e| ModelError::Load(format!("model loader task failed: {e}")))?;

        Ok(Arc::new(SherpaKokoroModel {
            engine: Arc::new(Mutex::new(engine)),
            speed: self.config.speed,
        }))
    }
}

/// Validate a model directory and build the engine config for it.
fn kokoro_config(model_dir: &Path, speed: f32) -> Result<KokoroTtsConfig, ModelError> {
    if !model_dir.is_dir() {
        return Err(ModelError::NotFound(model_dir.to_path_buf()));
    }

    for name in REQUIRED_FILES {
        let path = model_dir.join(name);
        if !path.is_file() {
            return Err(ModelError::NotFound(path));
        }
        debug!(path = %path.display(), "Found Kokoro {name}");
    }

    Ok(KokoroTtsConfig {
        model: path_string(&model_dir.join("model.onnx"))?,
        voices: path_string(&model_dir.join("voices.bin"))?,
        tokens: path_string(&model_dir.join("tokens.txt"))?,
        data_dir: path_string(&model_dir.join(ESPEAK_DATA_DIR))?,
        length_scale: speed,
        ..Default::default()
    })
}

fn path_string(path: &Path) -> Result<String, ModelError> {
    path.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| ModelError::Load(format!("path is not valid UTF-8: {}", path.display())))
}

// ── Model ──────────────────────────────────────────────────────────

/// A loaded Kokoro engine.
pub struct SherpaKokoroModel {
    engine: Arc<Mutex<KokoroTts>>,
    speed: f32,
}

impl SpeechModel for SherpaKokoroModel {
    fn sample_rate(&self) -> u32 {
        SHERPA_TTS_SAMPLE_RATE
    }

    fn generate(&self, text: &str, voice: &str) -> Result<AudioStream, ModelError> {
        let segments = segment_text(text);
        let sid = speaker_id(voice);
        let speed = self.speed;
        let engine = Arc::clone(&self.engine);

        debug!(
            text_len = text.len(),
            segments = segments.len(),
            voice,
            sid,
            "Streaming Kokoro synthesis"
        );

        let stream = stream::iter(segments).then(move |segment| {
            let engine = Arc::clone(&engine);
            async move { synthesize(engine, segment, sid, speed).await }
        });

        Ok(stream.boxed())
    }
}

async fn synthesize(
    engine: Arc<Mutex<KokoroTts>>,
    segment: String,
    sid: i32,
    speed: f32,
) -> Result<AudioChunk, ModelError> {
    let audio = tokio::task::spawn_blocking(move || {
        let mut guard = engine
            .lock()
            .map_err(|e| ModelError::Synthesis(format!("engine lock poisoned: {e}")))?;
        guard
            .create(&segment, sid, speed)
            .map_err(|e| ModelError::Synthesis(e.to_string()))
    })
    .await
    .map_err(|e| ModelError::Synthesis(format!("synthesis task failed: {e}")))??;

    if audio.sample_rate != SHERPA_TTS_SAMPLE_RATE {
        warn!(
            sample_rate = audio.sample_rate,
            expected = SHERPA_TTS_SAMPLE_RATE,
            "Unexpected Kokoro sample rate"
        );
    }
    debug!(samples = audio.samples.len(), "Segment synthesized");

    Ok(AudioChunk::new(audio.samples))
}

// ── Voice catalogue ────────────────────────────────────────────────
//
// Speaker ids are indices into the packed `voices.bin` style matrix of the
// `kokoro-en-v0_19` model, in the order of its `speaker2id` metadata.

const KOKORO_VOICES: [(&str, &str, &str, VoiceGender); 11] = [
    ("af", "Default", "American English", VoiceGender::Female),
    ("af_bella", "Bella", "American English", VoiceGender::Female),
    ("af_nicole", "Nicole", "American English", VoiceGender::Female),
    ("af_sarah", "Sarah", "American English", VoiceGender::Female),
    ("af_sky", "Sky", "American English", VoiceGender::Female),
    ("am_adam", "Adam", "American English", VoiceGender::Male),
    ("am_michael", "Michael", "American English", VoiceGender::Male),
    ("bf_emma", "Emma", "British English", VoiceGender::Female),
    ("bf_isabella", "Isabella", "British English", VoiceGender::Female),
    ("bm_george", "George", "British English", VoiceGender::Male),
    ("bm_lewis", "Lewis", "British English", VoiceGender::Male),
];

/// Map a voice id to its sherpa-onnx speaker id; unknown voices use speaker 0.
fn speaker_id(voice: &str) -> i32 {
    KOKORO_VOICES
        .iter()
        .position(|(id, ..)| *id == voice)
        .and_then(|idx| i32::try_from(idx).ok())
        .unwrap_or_else(|| {
            warn!(voice, "Unknown Kokoro voice, using speaker 0");
            0
        })
}

/// Every voice in the `kokoro-en-v0_19` model.
#[must_use]
pub fn sherpa_kokoro_voices() -> Vec<VoiceInfo> {
    KOKORO_VOICES
        .iter()
        .map(|&(id, name, category, gender)| voice_info(id, name, category, gender))
        .collect()
}
