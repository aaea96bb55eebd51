//! CloudWatch Logs calls used by the enumerator, gate and driver
//!
//! [`LogsApi`] narrows the SDK surface to the five calls Archivist makes, so the
//! paging, tag filtering and error mapping above it can run against scripted
//! responses.

use crate::adapters::cloudwatch::client::CloudWatchClients;
use crate::domain::{ArchivistError, Region, Result, SubmitError};
use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::operation::create_export_task::CreateExportTaskError;
use aws_sdk_cloudwatchlogs::types::ExportTaskStatusCode;
use std::collections::HashMap;

/// One log group from a DescribeLogGroups page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupEntry {
    pub name: String,
    pub arn: Option<String>,
}

/// One DescribeLogGroups page
#[derive(Debug, Clone, Default)]
pub struct LogGroupPage {
    pub groups: Vec<LogGroupEntry>,
    pub next_token: Option<String>,
}

/// Arguments of CreateExportTask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTaskRequest {
    pub log_group: String,
    pub from_millis: i64,
    pub to_millis: i64,
    pub bucket: String,
    pub prefix: String,
}

#[async_trait]
pub trait LogsApi: Send + Sync {
    /// One page of log groups, optionally filtered by name prefix
    async fn describe_log_groups(
        &self,
        region: &Region,
        name_prefix: Option<&str>,
        next_token: Option<String>,
    ) -> Result<LogGroupPage>;

    /// Tags of a log group, addressed by ARN without the trailing `:*`
    async fn log_group_tags(&self, region: &Region, arn: &str) -> Result<HashMap<String, String>>;

    /// Id of some export task in `status`, if any
    async fn find_export_task(
        &self,
        region: &Region,
        status: ExportTaskStatusCode,
    ) -> Result<Option<String>>;

    /// Start an export task and return its id
    async fn create_export_task(
        &self,
        region: &Region,
        request: &ExportTaskRequest,
    ) -> std::result::Result<String, SubmitError>;

    /// Status code of an export task, `None` when the provider does not know it
    async fn export_task_status(
        &self,
        region: &Region,
        task_id: &str,
    ) -> Result<Option<ExportTaskStatusCode>>;
}

/// LimitExceededException means another task holds the export slot
pub(crate) fn classify_submit_error(err: &CreateExportTaskError, message: String) -> SubmitError {
    if err.is_limit_exceeded_exception() {
        SubmitError::QuotaExceeded(message)
    } else {
        SubmitError::Provider(message)
    }
}

#[async_trait]
impl LogsApi for CloudWatchClients {
    async fn describe_log_groups(
        &self,
        region: &Region,
        name_prefix: Option<&str>,
        next_token: Option<String>,
    ) -> Result<LogGroupPage> {
        let output = self
            .get(region)?
            .describe_log_groups()
            .set_log_group_name_prefix(name_prefix.map(str::to_string))
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Discovery(format!(
                    "Failed to list log groups in {region}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let groups = output
            .log_groups()
            .iter()
            .filter_map(|group| {
                group.log_group_name().map(|name| LogGroupEntry {
                    name: name.to_string(),
                    arn: group.arn().map(str::to_string),
                })
            })
            .collect();

        Ok(LogGroupPage {
            groups,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn log_group_tags(&self, region: &Region, arn: &str) -> Result<HashMap<String, String>> {
        let output = self
            .get(region)?
            .list_tags_for_resource()
            .resource_arn(arn)
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Discovery(format!(
                    "Failed to read tags of {arn}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.tags().cloned().unwrap_or_default())
    }

    async fn find_export_task(
        &self,
        region: &Region,
        status: ExportTaskStatusCode,
    ) -> Result<Option<String>> {
        let output = self
            .get(region)?
            .describe_export_tasks()
            .status_code(status)
            .limit(1)
            .send()
            .await
            .map_err(|e| {
                ArchivistError::GateQuery(format!(
                    "Failed to describe export tasks in {region}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output
            .export_tasks()
            .first()
            .map(|task| task.task_id().unwrap_or_default().to_string()))
    }

    async fn create_export_task(
        &self,
        region: &Region,
        request: &ExportTaskRequest,
    ) -> std::result::Result<String, SubmitError> {
        let client = self
            .get(region)
            .map_err(|e| SubmitError::Provider(e.to_string()))?;

        let output = client
            .create_export_task()
            .log_group_name(&request.log_group)
            .from(request.from_millis)
            .to(request.to_millis)
            .destination(&request.bucket)
            .destination_prefix(&request.prefix)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                match e.as_service_error() {
                    Some(service_error) => classify_submit_error(service_error, message),
                    None => SubmitError::Provider(message),
                }
            })?;

        Ok(output.task_id().unwrap_or_default().to_string())
    }

    async fn export_task_status(
        &self,
        region: &Region,
        task_id: &str,
    ) -> Result<Option<ExportTaskStatusCode>> {
        let output = self
            .get(region)?
            .describe_export_tasks()
            .task_id(task_id)
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Provider(format!(
                    "Failed to describe export task {task_id}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let Some(task) = output.export_tasks().first() else {
            return Ok(None);
        };

        task.status()
            .and_then(|s| s.code())
            .cloned()
            .map(Some)
            .ok_or_else(|| ArchivistError::Provider(format!("Export task {task_id} has no status")))
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    //! In-process [`LogsApi`] answering from fixed tables

    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct ScriptedLogs {
        /// Pages keyed by region and the token the page was requested with
        pub pages: HashMap<(Region, Option<String>), LogGroupPage>,
        /// Tags by ARN; an ARN missing here fails the lookup
        pub tags: HashMap<String, HashMap<String, String>>,
        /// Tasks visible to the gate: (region, status, task id)
        pub active: Vec<(Region, ExportTaskStatusCode, String)>,
        /// Reply to CreateExportTask; accepted as "task-1" when unset
        pub create_reply: Option<std::result::Result<String, SubmitError>>,
        /// Status by task id; unknown ids are not found
        pub statuses: HashMap<String, ExportTaskStatusCode>,
        /// Every call made, in order
        pub calls: Mutex<Vec<String>>,
        /// Requests passed to CreateExportTask
        pub created: Mutex<Vec<ExportTaskRequest>>,
    }

    impl ScriptedLogs {
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl LogsApi for ScriptedLogs {
        async fn describe_log_groups(
            &self,
            region: &Region,
            name_prefix: Option<&str>,
            next_token: Option<String>,
        ) -> Result<LogGroupPage> {
            self.log(format!(
                "describe_log_groups {region} {name_prefix:?} {next_token:?}"
            ));
            self.pages
                .get(&(region.clone(), next_token))
                .cloned()
                .ok_or_else(|| ArchivistError::Discovery(format!("no page scripted for {region}")))
        }

        async fn log_group_tags(
            &self,
            _region: &Region,
            arn: &str,
        ) -> Result<HashMap<String, String>> {
            self.log(format!("log_group_tags {arn}"));
            self.tags
                .get(arn)
                .cloned()
                .ok_or_else(|| ArchivistError::Discovery("AccessDenied".to_string()))
        }

        async fn find_export_task(
            &self,
            region: &Region,
            status: ExportTaskStatusCode,
        ) -> Result<Option<String>> {
            self.log(format!("find_export_task {region} {}", status.as_str()));
            Ok(self
                .active
                .iter()
                .find(|(r, s, _)| r == region && *s == status)
                .map(|(_, _, id)| id.clone()))
        }

        async fn create_export_task(
            &self,
            region: &Region,
            request: &ExportTaskRequest,
        ) -> std::result::Result<String, SubmitError> {
            self.log(format!("create_export_task {region} {}", request.log_group));
            self.created.lock().unwrap().push(request.clone());
            self.create_reply
                .clone()
                .unwrap_or_else(|| Ok("task-1".to_string()))
        }

        async fn export_task_status(
            &self,
            _region: &Region,
            task_id: &str,
        ) -> Result<Option<ExportTaskStatusCode>> {
            self.log(format!("export_task_status {task_id}"));
            Ok(self.statuses.get(task_id).cloned())
        }
    }
}
