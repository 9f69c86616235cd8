//! Core protocol types and ports for the `ttsd` text-to-speech sidecar.
//!
//! This crate holds everything that is pure or transport-agnostic:
//!
//! - [`command`]: parsing of the JSON-lines command protocol read from stdin
//! - [`pcm`]: float → 16-bit little-endian PCM conversion
//! - [`frame`]: the length-prefixed binary framing written to stdout
//! - [`model`]: the speech-model ports (`ModelLoader`, `SpeechModel`)
//! - [`diagnostics`]: the line-oriented diagnostic channel (`READY`, `ERROR:`)
//!
//! Runtime wiring (reader task, generation controller, concrete engines)
//! lives in `ttsd-voice`.

pub mod command;
pub mod diagnostics;
pub mod frame;
pub mod model;
pub mod pcm;

// Re-export commonly used types for convenience
pub use command::{Command, ProtocolError, parse_line};
pub use diagnostics::{DiagnosticSink, MemoryDiagnostics, StderrDiagnostics};
pub use frame::{Frame, FrameError, FrameWriter, encode_frame, read_frame};
pub use model::{AudioChunk, AudioStream, ModelError, ModelLoader, SpeechModel};
pub use pcm::{encode_pcm16, sample_to_i16};
