//! Export slot check

use crate::adapters::cloudwatch::api::LogsApi;
use crate::adapters::provider::QuotaGate;
use crate::domain::{Region, Result};
use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::types::ExportTaskStatusCode;
use std::sync::Arc;

/// Statuses that hold the export slot
const ACTIVE_STATUSES: [ExportTaskStatusCode; 3] = [
    ExportTaskStatusCode::Pending,
    ExportTaskStatusCode::PendingCancel,
    ExportTaskStatusCode::Running,
];

/// Quota gate backed by DescribeExportTasks
///
/// Every configured region is asked on every call; nothing is cached.
pub struct CloudWatchQuotaGate {
    api: Arc<dyn LogsApi>,
    regions: Vec<Region>,
}

impl CloudWatchQuotaGate {
    pub fn new(api: Arc<dyn LogsApi>, regions: Vec<Region>) -> Self {
        Self { api, regions }
    }
}

#[async_trait]
impl QuotaGate for CloudWatchQuotaGate {
    async fn has_capacity(&self) -> Result<bool> {
        for region in &self.regions {
            for status in ACTIVE_STATUSES {
                if let Some(task_id) = self.api.find_export_task(region, status.clone()).await? {
                    tracing::debug!(
                        region = %region,
                        task_id = %task_id,
                        status = status.as_str(),
                        "Export slot occupied"
                    );
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}
