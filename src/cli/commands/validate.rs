//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Archivist configuration file.

use crate::config::parse_config;
use crate::config::schema::StoreBackend;
use crate::core::export::RunSettings;
use chrono::Utc;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match parse_config(config_path) {
            Ok(c) => {
                println!("Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.validate() {
            println!("Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        let settings = match RunSettings::from_config(&config, Utc::now()) {
            Ok(s) => s,
            Err(e) => {
                println!("Export window is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        for region in &config.regions {
            println!("  Region: {} -> {}", region.region, region.bucket);
        }
        println!("  Destination Prefix: {}", config.export.destination_prefix);
        println!(
            "  Export Window: {} .. {}",
            settings.window.from.to_rfc3339(),
            settings.window.to.to_rfc3339()
        );
        println!(
            "  Skip Tag: {} = {}",
            config.export.skip_tag_key, config.export.skip_tag_value
        );
        println!("  Schedule: {}", config.orchestrator.schedule);
        println!(
            "  Poll Interval: {}s",
            config.orchestrator.poll_interval_seconds
        );
        println!("  Run Timeout: {}s", config.orchestrator.run_timeout_seconds);

        match config.store.backend {
            StoreBackend::DynamoDB => {
                let table = config
                    .store
                    .dynamodb
                    .as_ref()
                    .map(|d| d.table_name.clone())
                    .unwrap_or_default();
                println!("  Progress Store: DynamoDB (table {table})");
            }
            StoreBackend::PostgreSQL => {
                if let Some(ref pg_config) = config.store.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Progress Store: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config
                            .connection_string
                            .expose_secret()
                            .as_ref()
                            .rsplit('@')
                            .next()
                            .unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
            StoreBackend::Memory => println!("  Progress Store: in-memory (not durable)"),
        }
        println!(
            "  Failure Notifications: {}",
            config
                .notification
                .topic_arn
                .as_deref()
                .unwrap_or("disabled")
        );
        println!();

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}.execute("does-not-exist.toml").await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_minimal_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"[[regions]]\nregion = \"us-east-1\"\nbucket = \"archive\"\n\n[store]\nbackend = \"memory\"\n",
        )
        .unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }
}
