//! Progress storage abstraction
//!
//! This module defines the trait that progress store backends must implement
//! to persist per-unit export progress.

use crate::core::state::record::ProgressRecord;
use crate::domain::ids::{LogGroupName, Region};
use crate::domain::Result;
use async_trait::async_trait;

/// Progress storage trait
///
/// Backends keep one record per `(region, name)`. A read issued after a
/// successful [`save_record`](ProgressStorage::save_record) for the same key
/// must observe that write.
#[async_trait]
pub trait ProgressStorage: Send + Sync {
    /// Load a progress record
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(ProgressRecord))` if found, `Ok(None)` if the unit has no record.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails for reasons other than "not found".
    async fn load_record(&self, region: &Region, name: &LogGroupName)
        -> Result<Option<ProgressRecord>>;

    /// Create or replace a progress record
    ///
    /// # Errors
    ///
    /// Returns an error if the write is not durable.
    async fn save_record(&self, record: &ProgressRecord) -> Result<()>;

    /// List every progress record
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn list_records(&self) -> Result<Vec<ProgressRecord>>;

    /// Verify the backend is reachable
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Create tables or schema the backend needs
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    /// Backend name for logs and status output
    fn backend_name(&self) -> &str;
}
