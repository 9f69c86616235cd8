//! Generation controller: the sidecar's state machine.
//!
//! ```text
//!   Loading → WarmingUp → Ready ⇄ Generating
//!                           │
//!                           └──(quit / input closed)──→ ShuttingDown → Terminated
//! ```
//!
//! Startup loads the model once and runs a single throwaway generation to
//! prime the engine, then emits `READY`. After that the controller drains the
//! command queue one command at a time. Generations never overlap: the next
//! queued command is not looked at until the current generation has written
//! its end marker.
//!
//! Every generation ends with exactly one end-of-generation frame, whether
//! it completed, was interrupted, was empty or failed. Model errors are
//! reported as `ERROR:` lines and never stop the controller; only a broken
//! output stream does.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use ttsd_core::{
    AudioStream, Command, DiagnosticSink, FrameWriter, ModelError, ModelLoader, SpeechModel,
    encode_pcm16,
};

use crate::error::VoiceError;
use crate::interrupt::InterruptFlag;

/// Text spoken once at startup to warm the engine up.
pub const DEFAULT_WARMUP_TEXT: &str = "Hello.";

// ── Controller state machine ───────────────────────────────────────

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Loading the speech model.
    Loading,

    /// Running the warm-up generation.
    WarmingUp,

    /// Idle, waiting for the next command.
    Ready,

    /// Streaming a generation to the output.
    Generating,

    /// Quit received (or input closed); leaving the main loop.
    ShuttingDown,

    /// Main loop has returned.
    Terminated,
}

impl ControllerState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::WarmingUp => "warming_up",
            Self::Ready => "ready",
            Self::Generating => "generating",
            Self::ShuttingDown => "shutting_down",
            Self::Terminated => "terminated",
        }
    }
}

// ── Generation outcome ─────────────────────────────────────────────

/// How a generation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    /// The model stream was consumed to the end.
    Completed,

    /// An interrupt stopped the stream early.
    Interrupted,

    /// Blank text; the model was not invoked.
    Empty,

    /// The model failed to start or failed mid-stream.
    Failed,
}

/// Summary of one generation, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub status: GenerationStatus,

    /// Audio frames written (the end marker is not counted).
    pub frames: usize,

    /// PCM payload bytes written.
    pub bytes: usize,
}

impl GenerationOutcome {
    const fn new(status: GenerationStatus) -> Self {
        Self {
            status,
            frames: 0,
            bytes: 0,
        }
    }
}

// ── Configuration ──────────────────────────────────────────────────

/// Startup and per-request settings for the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Engine-specific model identifier passed to the [`ModelLoader`].
    pub model_id: String,

    /// Voice used for every generation.
    pub voice: String,

    /// Text for the warm-up generation.
    pub warmup_text: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            model_id: crate::models::DEFAULT_MODEL_ID.to_string(),
            voice: crate::backend::DEFAULT_VOICE.to_string(),
            warmup_text: DEFAULT_WARMUP_TEXT.to_string(),
        }
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// Drives model startup and sequential generation.
pub struct GenerationController<W> {
    state: ControllerState,
    config: ControllerConfig,
    model: Option<Arc<dyn SpeechModel>>,
    interrupt: InterruptFlag,
    writer: FrameWriter<W>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl<W: AsyncWrite + Unpin> GenerationController<W> {
    /// Create a controller in the `Loading` state.
    pub fn new(
        config: ControllerConfig,
        interrupt: InterruptFlag,
        output: W,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            state: ControllerState::Loading,
            config,
            model: None,
            interrupt,
            writer: FrameWriter::new(output),
            diagnostics,
        }
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Unwrap the output writer.
    pub fn into_output(self) -> W {
        self.writer.into_inner()
    }

    // ── Startup ────────────────────────────────────────────────────

    /// Load the model, warm it up, and emit `READY`.
    ///
    /// A load failure is fatal: it is reported as an `ERROR:` line and
    /// returned. A warm-up failure is only logged; `READY` is emitted anyway.
    pub async fn start(&mut self, loader: &dyn ModelLoader) -> Result<(), VoiceError> {
        self.set_state(ControllerState::Loading);
        info!(model = %self.config.model_id, "Loading model");

        let model = match loader.load(&self.config.model_id).await {
            Ok(model) => model,
            Err(e) => {
                let err = VoiceError::ModelLoad(e);
                self.diagnostics.error(&err.to_string());
                return Err(err);
            }
        };
        info!(sample_rate = model.sample_rate(), "Model loaded");

        self.set_state(ControllerState::WarmingUp);
        info!("Warming up");
        match warm_up(model.as_ref(), &self.config.warmup_text, &self.config.voice).await {
            Ok(samples) => info!(samples, "Warm-up done"),
            Err(e) => warn!(error = %e, "Warm-up failed"),
        }

        self.model = Some(model);
        self.set_state(ControllerState::Ready);
        self.diagnostics.ready();
        Ok(())
    }

    // ── Main loop ──────────────────────────────────────────────────

    /// Process commands until `quit` or until the queue closes.
    ///
    /// Commands still queued when the input closes are processed first.
    pub async fn run(
        &mut self,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> Result<(), VoiceError> {
        if self.state != ControllerState::Ready {
            return Err(VoiceError::NotReady(self.state.as_str()));
        }

        loop {
            let Some(command) = commands.recv().await else {
                info!("Command queue closed");
                break;
            };

            match command {
                Command::Generate { text } => {
                    self.generate(&text).await?;
                }
                Command::Quit => {
                    info!("Quit requested");
                    break;
                }
                Command::Interrupt => {
                    // Interrupts target the running generation and never travel through the queue
                    debug!("Ignoring queued interrupt");
                }
                Command::Unknown { raw } => {
                    self.diagnostics.error(&format!("Unknown command: {raw}"));
                }
            }
        }

        self.set_state(ControllerState::ShuttingDown);
        info!("Shutting down");
        self.set_state(ControllerState::Terminated);
        Ok(())
    }

    // ── Generation routine ─────────────────────────────────────────

    /// Stream one request to the output and terminate it with an end marker.
    ///
    /// Clears the interrupt flag first. Only output errors are returned.
    pub async fn generate(&mut self, text: &str) -> Result<GenerationOutcome, VoiceError> {
        let Some(model) = self.model.clone() else {
            return Err(VoiceError::NotReady(self.state.as_str()));
        };

        if self.interrupt.clear() {
            debug!("Discarded interrupt left over from before this generation");
        }
        self.set_state(ControllerState::Generating);

        let outcome = self.stream_audio(model.as_ref(), text).await?;
        self.writer.write_end().await?;

        info!(
            status = ?outcome.status,
            frames = outcome.frames,
            bytes = outcome.bytes,
            "Generation finished"
        );
        self.set_state(ControllerState::Ready);
        Ok(outcome)
    }

    async fn stream_audio(
        &mut self,
        model: &dyn SpeechModel,
        text: &str,
    ) -> Result<GenerationOutcome, VoiceError> {
        if text.trim().is_empty() {
            return Ok(GenerationOutcome::new(GenerationStatus::Empty));
        }

        debug!(text_len = text.len(), voice = %self.config.voice, "Starting generation");

        let mut stream = match model.generate(text, &self.config.voice) {
            Ok(stream) => stream,
            Err(e) => {
                self.report_generation_error(&e);
                return Ok(GenerationOutcome::new(GenerationStatus::Failed));
            }
        };

        let mut outcome = GenerationOutcome::new(GenerationStatus::Completed);

        while let Some(item) = stream.next().await {
            if self.interrupt.is_set() {
                info!(frames = outcome.frames, "Generation interrupted");
                outcome.status = GenerationStatus::Interrupted;
                break;
            }

            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.report_generation_error(&e);
                    outcome.status = GenerationStatus::Failed;
                    break;
                }
            };

            // A zero-length frame would read as the end marker
            if chunk.is_empty() {
                debug!("Skipping empty audio chunk");
                continue;
            }

            let pcm = encode_pcm16(&chunk.samples);
            self.writer.write_audio(&pcm).await?;
            outcome.frames += 1;
            outcome.bytes += pcm.len();
        }

        Ok(outcome)
    }

    fn report_generation_error(&self, error: &ModelError) {
        self.diagnostics
            .error(&format!("Generation failed: {error}"));
    }

    fn set_state(&mut self, state: ControllerState) {
        if self.state != state {
            debug!(from = self.state.as_str(), to = state.as_str(), "Controller state changed");
            self.state = state;
        }
    }
}

/// Run one generation to completion and discard its audio.
///
/// Returns the number of samples produced.
async fn warm_up(model: &dyn SpeechModel, text: &str, voice: &str) -> Result<usize, ModelError> {
    let mut stream: AudioStream = model.generate(text, voice)?;
    let mut samples = 0;
    while let Some(chunk) = stream.next().await {
        samples += chunk?.len();
    }
    Ok(samples)
}
