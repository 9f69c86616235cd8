//! Serve command handler - runs the sidecar protocol on the process's stdio.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use ttsd_core::StderrDiagnostics;
use ttsd_voice::{BackendConfig, ControllerConfig, default_loader, serve};

use crate::error::CliError;
use crate::parser::ServeArgs;

/// Execute the serve command.
///
/// Returns once `quit` is received or stdin closes. A model load failure has
/// already been reported as an `ERROR:` line when this returns an error.
pub async fn execute(models_dir: PathBuf, args: ServeArgs) -> Result<()> {
    let backend = BackendConfig::new(models_dir, args.speed);
    info!(
        model = %args.model,
        voice = %args.voice,
        speed = backend.speed,
        models_dir = %backend.models_dir.display(),
        "Starting ttsd sidecar"
    );

    let loader = default_loader(backend);
    let config = ControllerConfig {
        model_id: args.model,
        voice: args.voice,
        warmup_text: args.warmup_text,
    };

    let signals = tokio::spawn(ignore_ctrl_c());
    let result = serve(
        config,
        loader.as_ref(),
        tokio::io::stdin(),
        tokio::io::stdout(),
        Arc::new(StderrDiagnostics::new()),
    )
    .await;
    signals.abort();

    result.map_err(CliError::from)?;
    info!("ttsd sidecar stopped");
    Ok(())
}

/// Swallow SIGINT: the host owns the sidecar's lifecycle.
async fn ignore_ctrl_c() {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for Ctrl+C");
            return;
        }
        info!("Ignoring Ctrl+C; send {{\"cmd\":\"quit\"}} to stop");
    }
}
