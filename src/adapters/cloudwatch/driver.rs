//! Export task submission and status

use crate::adapters::cloudwatch::api::{ExportTaskRequest, LogsApi};
use crate::adapters::provider::ExportDriver;
use crate::core::export::window::ExportWindow;
use crate::domain::{
    ArchivistError, ExportDestination, ExportUnit, JobHandle, JobState, Result, SubmitError,
};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

/// Export driver backed by CreateExportTask and DescribeExportTasks
pub struct CloudWatchExportDriver {
    api: Arc<dyn LogsApi>,
    window: ExportWindow,
}

impl CloudWatchExportDriver {
    /// Create a driver exporting `window` for every unit
    pub fn new(api: Arc<dyn LogsApi>, window: ExportWindow) -> Self {
        Self { api, window }
    }
}

#[async_trait]
impl ExportDriver for CloudWatchExportDriver {
    async fn submit(
        &self,
        unit: &ExportUnit,
        destination: &ExportDestination,
    ) -> std::result::Result<JobHandle, SubmitError> {
        let request = ExportTaskRequest {
            log_group: unit.name.to_string(),
            from_millis: self.window.from_millis(),
            to_millis: self.window.to_millis(),
            bucket: destination.bucket.clone(),
            prefix: destination.prefix.clone(),
        };

        let task_id = self.api.create_export_task(&unit.region, &request).await?;

        JobHandle::new(task_id).map_err(|e| {
            SubmitError::Provider(format!("CreateExportTask returned an unusable task id: {e}"))
        })
    }

    async fn job_status(&self, unit: &ExportUnit, handle: &JobHandle) -> Result<JobState> {
        let code = self
            .api
            .export_task_status(&unit.region, handle.as_str())
            .await?
            .ok_or_else(|| ArchivistError::JobNotFound(handle.to_string()))?;

        JobState::from_str(code.as_str()).map_err(ArchivistError::Provider)
    }
}
