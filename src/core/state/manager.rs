//! Progress store access layer
//!
//! This module provides the ProgressManager, which applies the export lifecycle
//! rules on top of a [`ProgressStorage`] backend.

use crate::adapters::store::traits::ProgressStorage;
use crate::core::state::record::{ExportStatus, ProgressRecord, ProgressRecordBuilder};
use crate::domain::ids::{JobHandle, LogGroupName, Region};
use crate::domain::{ExportUnit, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Progress manager for export records
///
/// Every write goes through a status transition check, so a COMPLETED record can
/// never move backwards and a record is only COMPLETED after
/// [`record_completed`](ProgressManager::record_completed) persisted it.
pub struct ProgressManager {
    /// Progress storage backend
    storage: Arc<dyn ProgressStorage + Send + Sync>,
}

impl ProgressManager {
    /// Create a new ProgressManager with a storage backend
    pub fn new_with_storage(storage: Arc<dyn ProgressStorage + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Backend name, for logs
    pub fn backend_name(&self) -> &str {
        self.storage.backend_name()
    }

    /// Verify the backend is reachable
    pub async fn test_connection(&self) -> Result<()> {
        self.storage.test_connection().await
    }

    /// Create the tables the backend needs
    pub async fn ensure_schema(&self) -> Result<()> {
        self.storage.ensure_schema().await
    }

    /// Load the record for a unit
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the unit was never attempted.
    pub async fn get_status(
        &self,
        region: &Region,
        name: &LogGroupName,
    ) -> Result<Option<ProgressRecord>> {
        self.storage.load_record(region, name).await
    }

    /// Pick the next unit to export
    ///
    /// Returns the first candidate, in the given order, whose record is absent,
    /// PENDING or FAILED and which is not in `skip`. Candidates that are
    /// IN_PROGRESS or COMPLETED are passed over.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be read. The scan stops at the first
    /// failed read rather than skipping ahead.
    pub async fn next_pending_unit(
        &self,
        candidates: &[ExportUnit],
        skip: &HashSet<ExportUnit>,
    ) -> Result<Option<ExportUnit>> {
        for unit in candidates {
            if skip.contains(unit) {
                continue;
            }

            let eligible = match self.get_status(&unit.region, &unit.name).await? {
                None => true,
                Some(record) => record.status.is_selectable(),
            };

            if eligible {
                return Ok(Some(unit.clone()));
            }
        }

        Ok(None)
    }

    /// Record an accepted submission
    ///
    /// Creates the record if absent, sets IN_PROGRESS and stores the job handle.
    ///
    /// # Errors
    ///
    /// Returns [`State`](crate::domain::ArchivistError::State) if the unit is already
    /// IN_PROGRESS or COMPLETED, or a persistence error if the write fails.
    pub async fn record_submitted(
        &self,
        region: &Region,
        name: &LogGroupName,
        handle: &JobHandle,
    ) -> Result<ProgressRecord> {
        let mut record = self.load_or_new(region, name).await?;
        record.mark_submitted(handle.clone())?;
        self.storage.save_record(&record).await?;

        tracing::info!(
            region = %region,
            log_group = %name,
            task_id = %handle,
            attempts = record.attempts,
            "Recorded export submission"
        );

        Ok(record)
    }

    /// Record a finished export
    ///
    /// Idempotent: a unit that is already COMPLETED is left untouched.
    pub async fn record_completed(
        &self,
        region: &Region,
        name: &LogGroupName,
        handle: &JobHandle,
    ) -> Result<ProgressRecord> {
        let mut record = match self.get_status(region, name).await? {
            Some(existing) if existing.is_completed() => {
                tracing::debug!(
                    region = %region,
                    log_group = %name,
                    "Export already recorded as completed"
                );
                return Ok(existing);
            }
            Some(existing) => existing,
            // A completion with no submission record still lands as COMPLETED
            None => ProgressRecordBuilder::new(region.clone(), name.clone())
                .status(ExportStatus::InProgress)
                .job_handle(handle.clone())
                .attempts(1)
                .build(),
        };

        record.mark_completed(handle.clone())?;
        self.storage.save_record(&record).await?;

        tracing::info!(
            region = %region,
            log_group = %name,
            task_id = %handle,
            "Recorded export completion"
        );

        Ok(record)
    }

    /// Record a failed export
    ///
    /// The unit becomes eligible for retry on a later run.
    pub async fn record_failed(
        &self,
        region: &Region,
        name: &LogGroupName,
        handle: Option<&JobHandle>,
        reason: &str,
    ) -> Result<ProgressRecord> {
        let mut record = self.load_or_new(region, name).await?;
        record.mark_failed(handle.cloned(), reason)?;
        self.storage.save_record(&record).await?;

        tracing::warn!(
            region = %region,
            log_group = %name,
            reason = %reason,
            "Recorded export failure"
        );

        Ok(record)
    }

    /// Store a submission error against a unit without changing its status
    pub async fn record_submission_error(
        &self,
        region: &Region,
        name: &LogGroupName,
        reason: &str,
    ) -> Result<ProgressRecord> {
        let mut record = self.load_or_new(region, name).await?;
        record.note_error(reason);
        self.storage.save_record(&record).await?;
        Ok(record)
    }

    /// List every stored record
    pub async fn list_records(&self) -> Result<Vec<ProgressRecord>> {
        self.storage.list_records().await
    }

    async fn load_or_new(&self, region: &Region, name: &LogGroupName) -> Result<ProgressRecord> {
        Ok(self
            .get_status(region, name)
            .await?
            .unwrap_or_else(|| ProgressRecordBuilder::new(region.clone(), name.clone()).build()))
    }
}
