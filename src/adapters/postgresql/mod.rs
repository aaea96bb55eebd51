//! PostgreSQL progress store
//!
//! Stores one row per export unit in the `export_progress` table.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLProgressStore;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLProgressRow;
