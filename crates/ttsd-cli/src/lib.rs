//! `ttsd` command-line interface.
//!
//! `main` is the composition root: it parses arguments, installs tracing,
//! builds the runtime and dispatches to a handler. Everything it calls lives
//! here so handlers can be exercised from tests.

pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

pub use error::{CliError, exit_code_for};
pub use parser::{Cli, Commands, RenderArgs, ServeArgs};
