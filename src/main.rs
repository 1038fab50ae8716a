// Stockpile - Daily table snapshot export
// Copyright (c) 2025 Stockpile Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use stockpile::cli::commands::EXIT_FAILURE;
use stockpile::cli::{Cli, Commands};
use stockpile::config::{load_config, LoggingConfig};
use stockpile::logging::init_logging;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config file when it loads; commands report
    // configuration errors themselves.
    let (config_level, logging_config) = match load_config(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => ("info".to_string(), LoggingConfig::console_only()),
    };
    let log_level = cli.log_level.clone().unwrap_or(config_level);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) if logging_config.local_enabled => {
            eprintln!("File logging unavailable ({e}), logging to console only");
            match init_logging(&log_level, &LoggingConfig::console_only()) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("Failed to initialize logging: {e}");
                    process::exit(EXIT_FAILURE);
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FAILURE);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Stockpile - Daily table snapshot export"
    );

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let exit_code = match execute_command(&cli, shutdown).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FAILURE
        }
    };

    // process::exit skips destructors; flush buffered file logs first
    drop(guard);
    process::exit(exit_code);
}

/// Cancel `shutdown` on SIGINT or SIGTERM
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT (Ctrl+C), cancelling");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, cancelling");
                }
            }
            eprintln!("\n⚠️  Shutdown signal received, rolling back the current run...");
            shutdown.cancel();
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("Received SIGINT (Ctrl+C), cancelling");
                eprintln!("\n⚠️  Shutdown signal received, rolling back the current run...");
                shutdown.cancel();
            }
        }
    });
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown: CancellationToken) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config, shutdown).await,
        Commands::Prune(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
