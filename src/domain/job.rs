//! Export task lifecycle as reported by the provider

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// State of an export task on the provider side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Accepted but not started
    Pending,
    /// Copying log data
    Running,
    /// Cancellation requested
    PendingCancel,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled before finishing
    Cancelled,
}

impl JobState {
    /// Whether the task will not change state again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    /// Whether the task finished successfully
    pub fn is_success(&self) -> bool {
        *self == JobState::Completed
    }

    /// Whether the task still occupies the provider's export slot
    pub fn occupies_slot(&self) -> bool {
        matches!(
            self,
            JobState::Pending | JobState::Running | JobState::PendingCancel
        )
    }

    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::PendingCancel => "PENDING_CANCEL",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(JobState::Pending),
            "RUNNING" => Ok(JobState::Running),
            "PENDING_CANCEL" => Ok(JobState::PendingCancel),
            "COMPLETED" => Ok(JobState::Completed),
            "FAILED" => Ok(JobState::Failed),
            "CANCELLED" => Ok(JobState::Cancelled),
            other => Err(format!("Unknown export task state: {other}")),
        }
    }
}
