//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Archivist using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Archivist - CloudWatch Logs to S3 export orchestrator
#[derive(Parser, Debug)]
#[command(name = "archivist")]
#[command(version, about, long_about = None)]
#[command(author = "Archivist Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "archivist.toml", env = "ARCHIVIST_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ARCHIVIST_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every pending log group in the configured regions
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show stored export progress
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["archivist", "run"]);
        assert_eq!(cli.config, "archivist.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_run_flags() {
        let cli = Cli::parse_from([
            "archivist",
            "--config",
            "custom.toml",
            "run",
            "--dry-run",
            "--yes",
            "--region",
            "us-east-1,eu-west-1",
        ]);
        assert_eq!(cli.config, "custom.toml");
        match cli.command {
            Commands::Run(args) => {
                assert!(args.dry_run);
                assert!(args.yes);
                assert_eq!(args.region, vec!["us-east-1", "eu-west-1"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["archivist", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_status_filters() {
        let cli = Cli::parse_from(["archivist", "status", "--status", "failed"]);
        match cli.command {
            Commands::Status(args) => assert_eq!(args.status.as_deref(), Some("failed")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["archivist", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["archivist", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
