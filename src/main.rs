// Archivist - CloudWatch Logs to S3 export orchestrator
// Copyright (c) 2025 Archivist Contributors
// Licensed under the MIT License

use archivist::cli::{Cli, Commands};
use archivist::config::{parse_config, LoggingConfig};
use archivist::logging::{init_logging, LoggingGuard};
use clap::Parser;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Archivist - CloudWatch Logs to S3 export orchestrator"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("SIGINT received, stopping after the current step");
                }
                _ = sigterm.recv() => {
                    tracing::info!("SIGTERM received, stopping after the current step");
                }
            }
            println!("\nShutdown signal received, stopping after the current step...");
            let _ = shutdown_tx.send(true);
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            } else {
                tracing::info!("SIGINT received, stopping after the current step");
                println!("\nShutdown signal received, stopping after the current step...");
                let _ = shutdown_tx.send(true);
            }
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    process::exit(exit_code);
}

/// File logging follows `[logging]` for `run`; the other commands log to the console only
fn setup_logging(cli: &Cli) -> archivist::domain::Result<LoggingGuard> {
    let file_config = match &cli.command {
        Commands::Run(_) => parse_config(&cli.config).ok(),
        _ => None,
    };

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let logging_config = file_config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::console_only);

    init_logging(&log_level, &logging_config)
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
