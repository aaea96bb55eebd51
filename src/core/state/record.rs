//! Progress record model
//!
//! One record per export unit ever attempted, keyed by `(region, name)`. Records
//! move forward through the export lifecycle and are never deleted here.

use crate::domain::ids::{JobHandle, LogGroupName, Region};
use crate::domain::{ArchivistError, ExportUnit, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Export status of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportStatus {
    /// Known but not yet submitted
    #[default]
    Pending,
    /// Export task submitted and not yet finished
    InProgress,
    /// Export task finished and recorded
    Completed,
    /// Export task failed; eligible for retry
    Failed,
}

impl ExportStatus {
    /// Whether `next` is a legal move from `self`
    ///
    /// Completed is final. `Completed -> Completed` is accepted so that recording a
    /// completion twice is a no-op rather than an error.
    pub fn can_transition_to(&self, next: ExportStatus) -> bool {
        use ExportStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Failed)
                | (Failed, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (Completed, Completed)
        )
    }

    /// Whether SELECT may pick a unit in this status
    pub fn is_selectable(&self) -> bool {
        matches!(self, ExportStatus::Pending | ExportStatus::Failed)
    }

    /// Upper-case storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Pending => "PENDING",
            ExportStatus::InProgress => "IN_PROGRESS",
            ExportStatus::Completed => "COMPLETED",
            ExportStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ExportStatus::Pending),
            "IN_PROGRESS" | "RUNNING" => Ok(ExportStatus::InProgress),
            "COMPLETED" => Ok(ExportStatus::Completed),
            "FAILED" => Ok(ExportStatus::Failed),
            other => Err(format!("Unknown export status: {other}")),
        }
    }
}

/// Durable progress entry for one export unit
///
/// # Examples
///
/// ```
/// use archivist::core::state::record::{ExportStatus, ProgressRecordBuilder};
/// use archivist::domain::{LogGroupName, Region};
///
/// let record = ProgressRecordBuilder::new(
///     Region::new("us-east-1").unwrap(),
///     LogGroupName::new("/aws/lambda/orders").unwrap(),
/// )
/// .build();
///
/// assert_eq!(record.status, ExportStatus::Pending);
/// assert!(record.job_handle.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Region of the log group (partition key)
    pub region: Region,

    /// Log group name (sort key)
    pub name: LogGroupName,

    /// Current export status
    pub status: ExportStatus,

    /// Export task id, set once a submission succeeded
    pub job_handle: Option<JobHandle>,

    /// Number of accepted submissions for this unit
    pub attempts: u32,

    /// When the latest export task was submitted
    pub submitted_at: Option<DateTime<Utc>>,

    /// When the unit reached COMPLETED or FAILED
    pub finished_at: Option<DateTime<Utc>>,

    /// Last error observed for this unit
    pub last_error: Option<String>,

    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Generate the storage id for a record
    ///
    /// A string in the format "{region}#{name}"
    pub fn generate_id(region: &Region, name: &LogGroupName) -> String {
        format!("{}#{}", region.as_str(), name.as_str())
    }

    /// Storage id of this record
    pub fn id(&self) -> String {
        Self::generate_id(&self.region, &self.name)
    }

    /// The unit this record tracks
    pub fn unit(&self) -> ExportUnit {
        ExportUnit::new(self.region.clone(), self.name.clone())
    }

    /// Check if the unit is completed
    pub fn is_completed(&self) -> bool {
        self.status == ExportStatus::Completed
    }

    /// Check if an export task is outstanding
    pub fn is_in_progress(&self) -> bool {
        self.status == ExportStatus::InProgress
    }

    /// Check if the last export failed
    pub fn is_failed(&self) -> bool {
        self.status == ExportStatus::Failed
    }

    /// Duration of the latest export task, if it finished
    pub fn last_export_duration(&self) -> Option<chrono::Duration> {
        match (self.submitted_at, self.finished_at) {
            (Some(submitted), Some(finished)) => Some(finished - submitted),
            _ => None,
        }
    }

    fn transition(&mut self, next: ExportStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ArchivistError::State(format!(
                "Illegal transition {} -> {} for {}",
                self.status,
                next,
                self.id()
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark an export task as submitted
    pub fn mark_submitted(&mut self, handle: JobHandle) -> Result<()> {
        self.transition(ExportStatus::InProgress)?;
        self.job_handle = Some(handle);
        self.attempts += 1;
        self.submitted_at = Some(self.updated_at);
        self.finished_at = None;
        self.last_error = None;
        Ok(())
    }

    /// Mark the export as completed
    pub fn mark_completed(&mut self, handle: JobHandle) -> Result<()> {
        self.transition(ExportStatus::Completed)?;
        self.job_handle = Some(handle);
        if self.finished_at.is_none() {
            self.finished_at = Some(self.updated_at);
        }
        Ok(())
    }

    /// Mark the export as failed
    pub fn mark_failed(&mut self, handle: Option<JobHandle>, reason: impl Into<String>) -> Result<()> {
        self.transition(ExportStatus::Failed)?;
        if handle.is_some() {
            self.job_handle = handle;
        }
        self.finished_at = Some(self.updated_at);
        self.last_error = Some(reason.into());
        Ok(())
    }

    /// Remember a submission error without changing the status
    pub fn note_error(&mut self, reason: impl Into<String>) {
        self.last_error = Some(reason.into());
        self.updated_at = Utc::now();
    }
}

/// Builder for creating ProgressRecord instances
pub struct ProgressRecordBuilder {
    region: Region,
    name: LogGroupName,
    status: ExportStatus,
    job_handle: Option<JobHandle>,
    attempts: u32,
    submitted_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecordBuilder {
    /// Create a new builder for the given key
    pub fn new(region: Region, name: LogGroupName) -> Self {
        Self {
            region,
            name,
            status: ExportStatus::Pending,
            job_handle: None,
            attempts: 0,
            submitted_at: None,
            finished_at: None,
            last_error: None,
            updated_at: None,
        }
    }

    /// Start from an export unit
    pub fn for_unit(unit: &ExportUnit) -> Self {
        Self::new(unit.region.clone(), unit.name.clone())
    }

    /// Set the status
    pub fn status(mut self, status: ExportStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the job handle
    pub fn job_handle(mut self, handle: JobHandle) -> Self {
        self.job_handle = Some(handle);
        self
    }

    /// Set the attempt count
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the submission time
    pub fn submitted_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.submitted_at = Some(timestamp);
        self
    }

    /// Set the finish time
    pub fn finished_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.finished_at = Some(timestamp);
        self
    }

    /// Set the last error
    pub fn last_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    /// Set the last write time
    pub fn updated_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.updated_at = Some(timestamp);
        self
    }

    /// Build the ProgressRecord instance
    pub fn build(self) -> ProgressRecord {
        ProgressRecord {
            region: self.region,
            name: self.name,
            status: self.status,
            job_handle: self.job_handle,
            attempts: self.attempts,
            submitted_at: self.submitted_at,
            finished_at: self.finished_at,
            last_error: self.last_error,
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn record() -> ProgressRecord {
        ProgressRecordBuilder::new(
            Region::new("us-east-1").unwrap(),
            LogGroupName::new("/aws/lambda/orders").unwrap(),
        )
        .build()
    }

    fn handle(id: &str) -> JobHandle {
        JobHandle::new(id).unwrap()
    }

    #[test_case(ExportStatus::Pending, ExportStatus::InProgress, true)]
    #[test_case(ExportStatus::Pending, ExportStatus::Completed, false ; "pending cannot skip to completed")]
    #[test_case(ExportStatus::InProgress, ExportStatus::Completed, true)]
    #[test_case(ExportStatus::InProgress, ExportStatus::Failed, true)]
    #[test_case(ExportStatus::InProgress, ExportStatus::Pending, false)]
    #[test_case(ExportStatus::Failed, ExportStatus::InProgress, true ; "failed is retried")]
    #[test_case(ExportStatus::Completed, ExportStatus::Pending, false ; "completed never reopens")]
    #[test_case(ExportStatus::Completed, ExportStatus::InProgress, false)]
    #[test_case(ExportStatus::Completed, ExportStatus::Failed, false)]
    #[test_case(ExportStatus::Completed, ExportStatus::Completed, true ; "completion is idempotent")]
    fn test_transitions(from: ExportStatus, to: ExportStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_generate_id() {
        let rec = record();
        assert_eq!(rec.id(), "us-east-1#/aws/lambda/orders");
    }

    #[test]
    fn test_mark_submitted() {
        let mut rec = record();
        rec.mark_submitted(handle("task-1")).unwrap();

        assert!(rec.is_in_progress());
        assert_eq!(rec.attempts, 1);
        assert_eq!(rec.job_handle, Some(handle("task-1")));
        assert!(rec.submitted_at.is_some());
        assert!(rec.finished_at.is_none());
    }

    #[test]
    fn test_mark_completed_twice_is_noop() {
        let mut rec = record();
        rec.mark_submitted(handle("task-1")).unwrap();
        rec.mark_completed(handle("task-1")).unwrap();
        let finished = rec.finished_at;

        rec.mark_completed(handle("task-1")).unwrap();
        assert!(rec.is_completed());
        assert_eq!(rec.finished_at, finished);
        assert_eq!(rec.attempts, 1);
    }

    #[test]
    fn test_completed_cannot_be_resubmitted() {
        let mut rec = record();
        rec.mark_submitted(handle("task-1")).unwrap();
        rec.mark_completed(handle("task-1")).unwrap();

        let err = rec.mark_submitted(handle("task-2")).unwrap_err();
        assert!(matches!(err, ArchivistError::State(_)));
        assert_eq!(rec.job_handle, Some(handle("task-1")));
    }

    #[test]
    fn test_failed_then_retried() {
        let mut rec = record();
        rec.mark_submitted(handle("task-1")).unwrap();
        rec.mark_failed(Some(handle("task-1")), "FAILED").unwrap();
        assert!(rec.is_failed());
        assert_eq!(rec.last_error.as_deref(), Some("FAILED"));

        rec.mark_submitted(handle("task-2")).unwrap();
        assert!(rec.is_in_progress());
        assert_eq!(rec.attempts, 2);
        assert!(rec.last_error.is_none());
    }

    #[test]
    fn test_export_duration() {
        let mut rec = record();
        assert!(rec.last_export_duration().is_none());

        rec.mark_submitted(handle("task-1")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        rec.mark_completed(handle("task-1")).unwrap();

        let duration = rec.last_export_duration().unwrap();
        assert!(duration.num_milliseconds() >= 0);
    }

    #[test]
    fn test_status_parse_accepts_legacy_running() {
        assert_eq!(
            ExportStatus::from_str("RUNNING").unwrap(),
            ExportStatus::InProgress
        );
        assert!(ExportStatus::from_str("DONE").is_err());
    }

    #[test]
    fn test_record_serialization() {
        let mut rec = record();
        rec.mark_submitted(handle("task-9")).unwrap();

        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("IN_PROGRESS"));
        assert!(json.contains("task-9"));

        let back: ProgressRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, ExportStatus::InProgress);
        assert_eq!(back.attempts, 1);
    }
}
