//! Provider abstraction traits
//!
//! These traits are the orchestrator's only view of the log provider: listing
//! log groups, checking the export slot, and submitting and polling export tasks.

use crate::domain::{ExportDestination, ExportUnit, JobHandle, JobState, Result, SubmitError};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lists the exportable units for one run
///
/// The stream is lazy so provider pagination happens as it is consumed. Each call
/// starts a fresh listing from the provider.
pub trait WorkEnumerator: Send + Sync {
    /// List units in a stable order
    fn list_units(&self) -> BoxStream<'_, Result<ExportUnit>>;
}

/// Admission check for the provider's single export slot
#[async_trait]
pub trait QuotaGate: Send + Sync {
    /// Whether no export task is currently pending or running
    ///
    /// # Errors
    ///
    /// Returns [`GateQuery`](crate::domain::ArchivistError::GateQuery) if the
    /// provider could not be asked.
    async fn has_capacity(&self) -> Result<bool>;
}

/// Submits and tracks export tasks
#[async_trait]
pub trait ExportDriver: Send + Sync {
    /// Submit one export task for `unit`
    ///
    /// # Errors
    ///
    /// - [`SubmitError::QuotaExceeded`] if the slot was taken after the gate check
    /// - [`SubmitError::Provider`] for any other rejection
    async fn submit(
        &self,
        unit: &ExportUnit,
        destination: &ExportDestination,
    ) -> std::result::Result<JobHandle, SubmitError>;

    /// Current provider state of a submitted export task
    ///
    /// # Errors
    ///
    /// Returns [`JobNotFound`](crate::domain::ArchivistError::JobNotFound) if the
    /// provider has no task with this handle, or a provider error otherwise.
    async fn job_status(&self, unit: &ExportUnit, handle: &JobHandle) -> Result<JobState>;
}
