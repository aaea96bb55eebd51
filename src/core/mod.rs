//! Core business logic for Archivist.
//!
//! # Modules
//!
//! - [`export`] - The run state machine, export window and run summary
//! - [`state`] - Progress records and the store access layer
//!
//! # Run Workflow
//!
//! 1. **Discover**: List log groups in every configured region
//! 2. **Reconcile**: Settle export tasks left in progress by an earlier run
//! 3. **Gate**: Wait until no export task is pending or running
//! 4. **Select**: Pick the first unit that is not completed or in progress
//! 5. **Submit**: Create the export task
//! 6. **Persist**: Record the submission, poll the task, record the result
//!
//! # Example
//!
//! ```rust,no_run
//! use archivist::config::load_config;
//! use archivist::core::export::Orchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("archivist.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let orchestrator = Orchestrator::from_config(&config, shutdown_rx).await?;
//! let summary = orchestrator.execute_run().await;
//!
//! println!("Submitted: {}", summary.submitted);
//! println!("Completed: {}", summary.completed);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod state;
