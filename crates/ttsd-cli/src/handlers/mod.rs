//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(...) -> anyhow::Result<()>`
//! - Thin wrappers that resolve CLI input, call into `ttsd-voice`, and
//!   map failures to [`CliError`](crate::CliError) for the exit code.

pub mod render;
pub mod serve;
pub mod voices;

use std::path::PathBuf;

use anyhow::Result;

use ttsd_voice::default_models_dir;

use crate::error::CliError;
use crate::parser::{Cli, Commands};

/// Route a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve(args) => serve::execute(models_dir(cli.models_dir)?, args).await,
        Commands::Render(args) => render::execute(models_dir(cli.models_dir)?, args).await,
        Commands::Voices => voices::execute(),
    }
}

fn models_dir(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(dir) => Ok(dir),
        None => default_models_dir().map_err(CliError::from),
    }
}
