//! Failure notifications
//!
//! When an export task ends FAILED or CANCELLED, or a run aborts, the
//! orchestrator hands a [`FailureNotice`] to a [`FailureNotifier`]. The SNS
//! implementation publishes it to the topic in `[notification]`.

pub mod sns;

pub use sns::SnsNotifier;

use crate::domain::{ExportUnit, JobHandle, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

/// Something operators should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureNotice {
    /// An export task finished without exporting the unit
    ExportFailed {
        unit: ExportUnit,
        task_id: Option<JobHandle>,
        status: String,
        window_start: DateTime<Utc>,
    },

    /// A run stopped before reaching DONE
    RunAborted { run_id: String, reason: String },
}

impl FailureNotice {
    /// Short subject line
    pub fn subject(&self) -> String {
        match self {
            FailureNotice::ExportFailed { unit, .. } => {
                format!("Log export failed: {}", unit.name)
            }
            FailureNotice::RunAborted { .. } => "Log export run aborted".to_string(),
        }
    }

    /// Message body
    pub fn message(&self) -> String {
        match self {
            FailureNotice::ExportFailed {
                unit,
                task_id,
                status,
                window_start,
            } => format!(
                "Export task failed for log group {} in region {}. Task ID: {}, Status: {}, Start Time: {}",
                unit.name,
                unit.region,
                task_id.as_ref().map(JobHandle::as_str).unwrap_or("none"),
                status,
                window_start.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            FailureNotice::RunAborted { run_id, reason } => {
                format!("Export run {run_id} aborted: {reason}")
            }
        }
    }
}

#[async_trait]
pub trait FailureNotifier: Send + Sync {
    async fn notify(&self, notice: &FailureNotice) -> Result<()>;
}
