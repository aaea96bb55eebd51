//! Configuration management for Archivist.
//!
//! Archivist reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ARCHIVIST_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use archivist::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("archivist.toml")?;
//!
//! for region in &config.regions {
//!     println!("{} -> {}", region.region, region.bucket);
//! }
//! println!("Schedule: {}", config.orchestrator.schedule);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [[regions]]
//! region = "us-east-1"
//! bucket = "s3://log-archive-use1"
//!
//! [[regions]]
//! region = "eu-west-1"
//! bucket = "s3://log-archive-euw1"
//!
//! [export]
//! destination_prefix = "exportedlogs"
//! window_days = 1
//!
//! [orchestrator]
//! poll_interval_seconds = 30
//! run_timeout_seconds = 86400
//! schedule = "cron(5 0 * * ? *)"
//!
//! [store]
//! backend = "dynamodb"
//!
//! [store.dynamodb]
//! table_name = "archivist-progress"
//!
//! [notification]
//! topic_arn = "arn:aws:sns:us-east-1:123456789012:log-export-alerts"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ArchivistConfig, DynamoDbConfig, ExportConfig, LoggingConfig,
    NotificationConfig, OrchestratorConfig, PostgreSQLConfig, RegionConfig, StoreBackend,
    StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
