//! External system integrations for Archivist.
//!
//! - [`provider`] - Traits for the export provider (enumerator, quota gate, export driver)
//! - [`cloudwatch`] - CloudWatch Logs implementation of the provider traits
//! - [`store`] - Progress store abstraction and factory
//! - [`dynamodb`] - DynamoDB progress store
//! - [`postgresql`] - PostgreSQL progress store
//! - [`memory`] - In-memory progress store for tests and dry runs
//! - [`notify`] - Failure notifications (SNS)
//!
//! # Design Pattern
//!
//! Adapters isolate AWS and database SDKs behind traits so the orchestrator can
//! be driven by fakes in tests.
//!
//! ```rust,no_run
//! use archivist::adapters::memory::MemoryProgressStore;
//! use archivist::core::state::ProgressManager;
//! use std::sync::Arc;
//!
//! let progress = ProgressManager::new_with_storage(Arc::new(MemoryProgressStore::new()));
//! assert_eq!(progress.backend_name(), "memory");
//! ```

pub mod cloudwatch;
pub mod dynamodb;
pub mod memory;
pub mod notify;
pub mod postgresql;
pub mod provider;
pub mod store;
