use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use coldstream::cli::{Cli, Mode};
use coldstream::commands;
use coldstream::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.verbose)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::load(Path::new(&cli.config)) {
        Ok(config) => config,
        Err(e) => {
            warn!(file = %cli.config, error = %e, "config not loaded, using defaults");
            Config::default()
        }
    };

    let result = match cli.mode() {
        Mode::Backtest { strategy_id, csv } => {
            commands::backtest::run(&strategy_id, &csv, cli.initial_balance, &config)
        }
        Mode::Replay { strategy_id, csv } => {
            commands::replay::run(&strategy_id, &csv, cli.initial_balance, &config)
        }
        Mode::Live => {
            commands::live::run(&cli.socket_endpoint, cli.initial_balance, &config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
