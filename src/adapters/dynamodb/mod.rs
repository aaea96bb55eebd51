//! DynamoDB progress store
//!
//! One item per export unit, keyed by `Region` (partition) and `Name` (sort).

pub mod adapter;
pub mod models;

pub use adapter::DynamoDbProgressStore;
