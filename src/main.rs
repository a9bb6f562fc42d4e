//! SchemaForge
//!
//! Laravel migration generator driven by a compact schema syntax.
//!
//! This is the main entry point for the command-line tool.

use std::process::ExitCode;

use forge_cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("failed to initialize logging: {:#}", e);
    }

    match forge_cli::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            forge_cli::report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::debug!(version = forge_cli::VERSION, "logging initialized");
    Ok(())
}
