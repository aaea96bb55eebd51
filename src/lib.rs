// Archivist - CloudWatch Logs to S3 export orchestrator
// Copyright (c) 2025 Archivist Contributors
// Licensed under the MIT License

//! # Archivist - CloudWatch Logs to S3 export orchestrator
//!
//! Archivist exports every CloudWatch Logs log group in a set of regions to S3.
//! The provider runs at most one export task at a time per account, so a run
//! submits one task, waits for it to finish, records the result and moves on.
//! Progress is kept per log group in a durable store, so an interrupted run is
//! picked up by the next one.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Orchestration state machine and progress rules
//! - [`adapters`] - CloudWatch Logs, DynamoDB, PostgreSQL and in-memory backends
//! - [`domain`] - Identifiers, units of work and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use archivist::config::load_config;
//! use archivist::core::export::Orchestrator;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("archivist.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//!     let orchestrator = Orchestrator::from_config(&config, shutdown_rx).await?;
//!     orchestrator.progress().ensure_schema().await?;
//!
//!     let summary = orchestrator.execute_run().await;
//!     println!("Completed {} of {} log groups", summary.completed, summary.units_discovered);
//!     Ok(())
//! }
//! ```
//!
//! ## Run phases
//!
//! ```text
//! DISCOVER -> GATE_CHECK <-> WAIT
//!                 |
//!               SELECT -> SUBMIT -> PERSIST -> GATE_CHECK
//!                 |
//!                DONE
//! ```
//!
//! A unit is only marked COMPLETED after its export task finished and the
//! progress store accepted the write.
//!
//! ## Error Handling
//!
//! Archivist uses [`domain::ArchivistError`] for all library errors:
//!
//! ```rust,no_run
//! use archivist::domain::ArchivistError;
//!
//! fn example() -> Result<(), ArchivistError> {
//!     let config = archivist::config::load_config("archivist.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
