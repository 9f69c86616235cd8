//! Sidecar composition: wires reader, queue, flag and controller together.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use ttsd_core::{DiagnosticSink, ModelLoader};

use crate::controller::{ControllerConfig, GenerationController};
use crate::error::VoiceError;
use crate::interrupt::InterruptFlag;
use crate::reader::{CommandRouter, spawn_command_reader};

/// Run the sidecar protocol over `input` / `output` until `quit` or end of input.
///
/// The command reader is only started after `READY`; input written earlier
/// waits in the stream. Returns an error if the model fails to load or the
/// output stream breaks.
pub async fn serve<R, W>(
    config: ControllerConfig,
    loader: &dyn ModelLoader,
    input: R,
    output: W,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> Result<(), VoiceError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let interrupt = InterruptFlag::new();
    let mut controller =
        GenerationController::new(config, interrupt.clone(), output, Arc::clone(&diagnostics));

    controller.start(loader).await?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let reader = spawn_command_reader(input, CommandRouter::new(interrupt, tx, diagnostics));

    let result = controller.run(&mut rx).await;

    // The reader may still be parked on a read that will never complete
    reader.abort();
    result
}
