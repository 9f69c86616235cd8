//! Runtime for the `ttsd` text-to-speech sidecar.
//!
//! # Architecture
//!
//! ```text
//!   stdin ──► Command Reader ──┬──► InterruptFlag ─────────────┐
//!   (task)                     └──► Command Queue ──► Generation Controller ──► stdout frames
//!                                                       │            ▲
//!                                                       ▼            │
//!                                                 SpeechModel (Kokoro via sherpa-onnx)
//! ```
//!
//! Diagnostics (`READY`, `ERROR: …`) go to stderr through a
//! [`ttsd_core::DiagnosticSink`]; tracing logs share the same stream.
//!
//! # Feature Flags
//!
//! - `sherpa` *(default)*: Kokoro TTS through sherpa-onnx. Without it the
//!   sidecar starts but every model load fails.

pub mod backend;
pub mod controller;
pub mod error;
pub mod interrupt;
pub mod models;
pub mod reader;
pub mod segment;
pub mod sidecar;

pub use backend::{
    BackendConfig, DEFAULT_VOICE, UnavailableLoader, VoiceGender, VoiceInfo, available_voices,
    default_loader,
};
pub use controller::{
    ControllerConfig, ControllerState, DEFAULT_WARMUP_TEXT, GenerationController,
    GenerationOutcome, GenerationStatus,
};
pub use error::VoiceError;
pub use interrupt::InterruptFlag;
pub use models::{DEFAULT_MODEL_ID, default_models_dir, resolve_model_dir};
pub use reader::{CommandRouter, LineOutcome, spawn_command_reader};
pub use segment::{MAX_SEGMENT_CHARS, segment_text};
pub use sidecar::serve;
