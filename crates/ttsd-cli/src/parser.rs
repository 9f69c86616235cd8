//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use ttsd_voice::{DEFAULT_MODEL_ID, DEFAULT_VOICE, DEFAULT_WARMUP_TEXT};

/// Command-line interface for the ttsd text-to-speech sidecar.
#[derive(Debug, Parser)]
#[command(name = "ttsd")]
#[command(about = "Persistent text-to-speech sidecar")]
#[command(version)]
pub struct Cli {
    /// Override the models directory for this invocation
    #[arg(long = "models-dir", global = true, env = "TTSD_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a model and serve the JSON-lines protocol on stdin/stdout
    Serve(ServeArgs),

    /// Synthesize one text and write raw 16-bit PCM to a file
    Render(RenderArgs),

    /// List the voices offered by the compiled speech backend as JSON
    Voices,
}

/// Arguments for `ttsd serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Model directory or id under the models directory
    #[arg(env = "TTSD_MODEL", default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Voice used for every generation
    #[arg(env = "TTSD_VOICE", default_value = DEFAULT_VOICE)]
    pub voice: String,

    /// Text spoken once at startup to warm the model up
    #[arg(long = "warmup-text", default_value = DEFAULT_WARMUP_TEXT)]
    pub warmup_text: String,

    /// Speaking-rate multiplier (clamped to 0.5-2.0)
    #[arg(long, env = "TTSD_SPEED", default_value_t = 1.0)]
    pub speed: f32,
}

/// Arguments for `ttsd render`.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Text to synthesize
    #[arg(long)]
    pub text: String,

    /// Destination file for the raw PCM (i16 little-endian, mono)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Model directory or id under the models directory
    #[arg(long, env = "TTSD_MODEL", default_value = DEFAULT_MODEL_ID)]
    pub model: String,

    /// Voice to synthesize with
    #[arg(long, env = "TTSD_VOICE", default_value = DEFAULT_VOICE)]
    pub voice: String,

    /// Speaking-rate multiplier (clamped to 0.5-2.0)
    #[arg(long, env = "TTSD_SPEED", default_value_t = 1.0)]
    pub speed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_positionals() {
        let cli = Cli::parse_from(["ttsd", "serve", "/models/kokoro", "bf_emma", "--speed", "1.5"]);

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.model, "/models/kokoro");
        assert_eq!(args.voice, "bf_emma");
        assert!((args.speed - 1.5).abs() < f32::EPSILON);
        assert_eq!(args.warmup_text, DEFAULT_WARMUP_TEXT);
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["ttsd", "voices", "--verbose", "--models-dir", "/tmp/models"]);

        assert!(cli.verbose);
        assert_eq!(cli.models_dir, Some(PathBuf::from("/tmp/models")));
        assert!(matches!(cli.command, Commands::Voices));
    }

    #[test]
    fn test_render_requires_text_and_output() {
        assert!(Cli::try_parse_from(["ttsd", "render", "--text", "hi"]).is_err());

        let cli = Cli::try_parse_from(["ttsd", "render", "--text", "hi", "-o", "out.pcm"]).unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.output, PathBuf::from("out.pcm"));
    }
}
