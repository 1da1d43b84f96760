use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod error;

use cli::Cli;
use config::AppConfig;
use error::AppError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_overrides(&cli.overrides);

    init_tracing(cli.log_level.as_deref(), &config.logging.level);

    match try_main(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    if let Some(threads) = config.runtime.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
        tracing::debug!("Using {threads} worker threads");
    }
    commands::execute(&cli.command, &config.analysis)
}

/// `--log-level` wins, then `RUST_LOG`, then the config file. Records from
/// the core library's `log` calls are forwarded into the subscriber.
fn init_tracing(cli_level: Option<&str>, config_level: &str) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
