//! Progress store abstraction layer
//!
//! This module provides trait-based abstraction over the progress store
//! backends (DynamoDB, PostgreSQL, in-memory).

pub mod factory;
pub mod traits;

pub use factory::create_progress_storage;
pub use traits::ProgressStorage;
