use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use todoist_bridge_rs::cli::Cli;
use todoist_bridge_rs::config::BridgeConfig;
use todoist_bridge_rs::server::{self, ServeError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            error_exit_code(&e)
        }
    }
}

async fn run(cli: &Cli) -> Result<(), ServeError> {
    let config = BridgeConfig::load(cli)?;
    tracing::debug!(?config, "configuration resolved");
    server::serve(config).await
}

/// Installs the global subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

/// Returns the exit code for an error.
fn error_exit_code(e: &ServeError) -> ExitCode {
    match e {
        ServeError::Config(_) => ExitCode::from(5),
        ServeError::Client(_) => ExitCode::from(2),
        ServeError::Io(_) => ExitCode::from(3),
    }
}
