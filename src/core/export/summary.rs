//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the result of one
//! orchestration run.

use crate::core::state::record::{ExportStatus, ProgressRecord};
use crate::domain::{ArchivistError, ExportUnit, JobHandle};
use std::fmt;
use std::time::Duration;

/// Orchestrator state, as recorded in the run trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Discover,
    GateCheck,
    Wait,
    Select,
    Submit,
    Persist,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Discover => "DISCOVER",
            RunPhase::GateCheck => "GATE_CHECK",
            RunPhase::Wait => "WAIT",
            RunPhase::Select => "SELECT",
            RunPhase::Submit => "SUBMIT",
            RunPhase::Persist => "PERSIST",
            RunPhase::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// Final state of one enumerated unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    /// The unit
    pub unit: ExportUnit,

    /// Stored status, `None` if the unit was never attempted
    pub status: Option<ExportStatus>,

    /// Last export task id
    pub job_handle: Option<JobHandle>,

    /// Last recorded error
    pub last_error: Option<String>,
}

impl UnitOutcome {
    /// Outcome from a stored record
    pub fn from_record(record: &ProgressRecord) -> Self {
        Self {
            unit: record.unit(),
            status: Some(record.status),
            job_handle: record.job_handle.clone(),
            last_error: record.last_error.clone(),
        }
    }

    /// Outcome for a unit without a record
    pub fn untouched(unit: ExportUnit) -> Self {
        Self {
            unit,
            status: None,
            job_handle: None,
            last_error: None,
        }
    }

    /// Outcome for a unit whose record could not be read for the report
    pub fn unreadable(unit: ExportUnit, error: &ArchivistError) -> Self {
        Self {
            unit,
            status: None,
            job_handle: None,
            last_error: Some(format!("status unavailable: {error}")),
        }
    }
}

/// Summary of one orchestration run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: String,

    /// Units returned by the work enumerator
    pub units_discovered: usize,

    /// Export tasks accepted by the provider
    pub submitted: usize,

    /// Units recorded COMPLETED during this run
    pub completed: usize,

    /// Units recorded FAILED during this run
    pub failed: usize,

    /// IN_PROGRESS records settled during discovery
    pub reconciled: usize,

    /// WAIT cycles spent on a closed gate
    pub wait_cycles: usize,

    /// Submissions rejected because the slot was taken after the gate opened
    pub quota_races: usize,

    /// Gate queries that failed and were treated as "no capacity"
    pub gate_errors: usize,

    /// Failure notifications delivered
    pub notifications_sent: usize,

    /// States visited, in order
    pub trace: Vec<RunPhase>,

    /// Per-unit final status
    pub outcomes: Vec<UnitOutcome>,

    /// Non-fatal errors encountered during the run
    pub errors: Vec<RunError>,

    /// Error that aborted the run, if any
    pub abort: Option<RunError>,

    /// Duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            units_discovered: 0,
            submitted: 0,
            completed: 0,
            failed: 0,
            reconciled: 0,
            wait_cycles: 0,
            quota_races: 0,
            gate_errors: 0,
            notifications_sent: 0,
            trace: Vec::new(),
            outcomes: Vec::new(),
            errors: Vec::new(),
            abort: None,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a non-fatal error
    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Whether the run reached DONE
    pub fn is_done(&self) -> bool {
        self.abort.is_none() && self.trace.last() == Some(&RunPhase::Done)
    }

    /// Whether the run finished without aborting and without failed units
    pub fn is_successful(&self) -> bool {
        self.is_done() && self.failed == 0
    }

    /// Number of visits to a phase
    pub fn phase_count(&self, phase: RunPhase) -> usize {
        self.trace.iter().filter(|p| **p == phase).count()
    }

    /// Number of enumerated units in a given stored status
    pub fn count_with_status(&self, status: ExportStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == Some(status))
            .count()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            discovered = self.units_discovered,
            submitted = self.submitted,
            completed = self.completed,
            failed = self.failed,
            reconciled = self.reconciled,
            wait_cycles = self.wait_cycles,
            quota_races = self.quota_races,
            notifications_sent = self.notifications_sent,
            duration_secs = self.duration.as_secs(),
            "Export run finished"
        );

        for error in &self.errors {
            tracing::warn!(
                error_type = ?error.error_type,
                message = %error.message,
                context = error.context.as_deref().unwrap_or(""),
                "Run error"
            );
        }

        if let Some(abort) = &self.abort {
            tracing::error!(
                error_type = ?abort.error_type,
                message = %abort.message,
                "Export run aborted"
            );
            for outcome in &self.outcomes {
                tracing::info!(
                    region = %outcome.unit.region,
                    log_group = %outcome.unit.name,
                    status = outcome.status.map(|s| s.as_str()).unwrap_or("NONE"),
                    "Unit status at abort"
                );
            }
        }
    }
}

/// Type of run error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorType {
    /// Listing log groups failed
    Discovery,
    /// Gate query failed
    GateQuery,
    /// Export task submission was rejected
    Submission,
    /// Provider call other than submission failed
    Provider,
    /// Progress store read or write failed
    Persistence,
    /// Progress record transition was rejected
    State,
    /// Run exceeded its wall-clock budget
    Timeout,
    /// Run was cancelled by a shutdown signal
    Interrupted,
    /// Configuration error
    Configuration,
    /// Failure notification was not delivered
    Notification,
    /// Unknown error
    Unknown,
}

/// Run error with context
#[derive(Debug, Clone)]
pub struct RunError {
    /// Type of error
    pub error_type: RunErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g. the unit being processed)
    pub context: Option<String>,
}

impl RunError {
    /// Create a new run error
    pub fn new(error_type: RunErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl From<&ArchivistError> for RunError {
    fn from(err: &ArchivistError) -> Self {
        let error_type = match err {
            ArchivistError::Discovery(_) => RunErrorType::Discovery,
            ArchivistError::GateQuery(_) => RunErrorType::GateQuery,
            ArchivistError::Submission(_) => RunErrorType::Submission,
            ArchivistError::Provider(_) | ArchivistError::JobNotFound(_) => RunErrorType::Provider,
            ArchivistError::Persistence(_) => RunErrorType::Persistence,
            ArchivistError::State(_) => RunErrorType::State,
            ArchivistError::Timeout(_) => RunErrorType::Timeout,
            ArchivistError::Interrupted(_) => RunErrorType::Interrupted,
            ArchivistError::Configuration(_) | ArchivistError::Validation(_) => {
                RunErrorType::Configuration
            }
            ArchivistError::Notification(_) => RunErrorType::Notification,
            ArchivistError::Serialization(_) | ArchivistError::Io(_) => RunErrorType::Unknown,
        };
        RunError::new(error_type, err.to_string())
    }
}
