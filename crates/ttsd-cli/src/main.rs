//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;

use ttsd_cli::{Cli, exit_code_for, handlers, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start the async runtime");
            return ExitCode::from(71); // EX_OSERR
        }
    };

    let result = runtime.block_on(handlers::dispatch(cli));

    // A stdin read parked on the blocking pool never returns on its own
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
