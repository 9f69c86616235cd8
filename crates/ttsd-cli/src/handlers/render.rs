//! Render command handler - one-off synthesis to a raw PCM file.
//!
//! Useful for pre-rendering fixed prompts (greetings, startup chimes) with
//! the same model and voice the sidecar uses. The file holds the chunks'
//! PCM back to back, without frame prefixes or a header.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use tracing::{info, warn};

use ttsd_core::{ModelLoader, encode_pcm16};
use ttsd_voice::{BackendConfig, VoiceError, default_loader};

use crate::error::CliError;
use crate::parser::RenderArgs;

/// What a render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub path: PathBuf,
    pub bytes: usize,
    pub sample_rate: u32,
    pub duration: Duration,
}

/// Execute the render command.
pub async fn execute(models_dir: PathBuf, args: RenderArgs) -> Result<()> {
    let loader = default_loader(BackendConfig::new(models_dir, args.speed));

    let summary = render_to_file(
        loader.as_ref(),
        &args.model,
        &args.voice,
        &args.text,
        &args.output,
    )
    .await?;

    println!(
        "Wrote {} bytes ({:.2}s at {} Hz) to {}",
        summary.bytes,
        summary.duration.as_secs_f64(),
        summary.sample_rate,
        summary.path.display()
    );
    Ok(())
}

/// Load `model_id`, synthesize `text` and write the PCM to `output`.
pub async fn render_to_file(
    loader: &dyn ModelLoader,
    model_id: &str,
    voice: &str,
    text: &str,
    output: &Path,
) -> Result<RenderSummary> {
    if text.trim().is_empty() {
        return Err(CliError::Arguments("--text must not be blank".to_string()).into());
    }

    let model = loader
        .load(model_id)
        .await
        .map_err(|e| CliError::from(VoiceError::ModelLoad(e)))?;
    let sample_rate = model.sample_rate();
    info!(model = model_id, voice, sample_rate, "Rendering");

    let mut stream = model
        .generate(text, voice)
        .map_err(|e| CliError::Model(format!("Generation failed: {e}")))?;

    let mut pcm = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CliError::Model(format!("Generation failed: {e}")))?;
        pcm.extend_from_slice(&encode_pcm16(&chunk.samples));
    }
    if pcm.is_empty() {
        warn!("Model produced no audio");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(CliError::from)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    tokio::fs::write(output, &pcm)
        .await
        .map_err(CliError::from)
        .with_context(|| format!("writing {}", output.display()))?;

    let samples = pcm.len() / 2;
    #[allow(clippy::cast_precision_loss)]
    let duration = if sample_rate > 0 {
        Duration::from_secs_f64(samples as f64 / f64::from(sample_rate))
    } else {
        Duration::ZERO
    };

    Ok(RenderSummary {
        path: output.to_path_buf(),
        bytes: pcm.len(),
        sample_rate,
        duration,
    })
}
