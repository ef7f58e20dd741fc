mod args;
mod commands;
mod serve;

use std::process::ExitCode;

use clap::Parser;
use monitor_app::{AppState, Result, load_config};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};

const LOG_TARGETS: &[&str] = &[
    "llm_cost_monitor_cli",
    "monitor_app",
    "monitor_db",
    "ingest",
    "http_api",
];

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = LOG_TARGETS
        .iter()
        .fold(String::from("warn"), |filter, target| {
            format!("{filter},{target}={level}")
        });
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8> {
    let (settings, found) = load_config(cli.config.as_deref())?;
    match &found {
        Some(path) => debug!(path = %path.display(), "loaded config"),
        None => debug!("no config file found, using defaults"),
    }

    let state = AppState::from_settings(settings);
    state.initialize()?;

    match cli.command {
        Command::Fetch(args) => commands::fetch(&state, args).await,
        Command::Report(args) => commands::report(&state, args),
        Command::Alert(args) => commands::alert(&state, args).await,
        Command::Notify(args) => commands::notify(&state, args).await,
        Command::Pricing(args) => commands::pricing(args),
        Command::Serve(args) => {
            serve::run(state, args.port).await?;
            Ok(0)
        }
    }
}
