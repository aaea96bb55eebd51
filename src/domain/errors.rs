//! Domain error types
//!
//! This module defines the error hierarchy for Archivist. Errors map onto the
//! failure classes of an orchestration run: discovery, gate queries, submission,
//! persistence and the run-level timeout. Third-party SDK and driver types never
//! leak through these variants; adapters render them to strings at the boundary.

use thiserror::Error;

/// Main Archivist error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum ArchivistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The work enumerator failed to list log groups
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// The quota gate could not determine provider capacity
    #[error("Gate query error: {0}")]
    GateQuery(String),

    /// An export task submission failed
    #[error("Submission error: {0}")]
    Submission(#[from] SubmitError),

    /// A provider call other than submission failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider does not know the export task
    #[error("Export task not found: {0}")]
    JobNotFound(String),

    /// A progress store read or write failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A progress record transition was rejected
    #[error("State error: {0}")]
    State(String),

    /// The run exceeded its wall-clock budget
    #[error("Run timed out after {0} seconds")]
    Timeout(u64),

    /// The run was cancelled by a shutdown signal
    #[error("Run interrupted: {0}")]
    Interrupted(String),

    /// A failure notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ArchivistError {
    /// Whether the error aborted the run because of the wall-clock budget
    pub fn is_timeout(&self) -> bool {
        matches!(self, ArchivistError::Timeout(_))
    }

    /// Whether the error came from a shutdown signal
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ArchivistError::Interrupted(_))
    }
}

/// Export task submission errors
///
/// Returned by [`ExportDriver::submit`](crate::adapters::provider::ExportDriver::submit).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Capacity was consumed between the gate check and the submission
    #[error("Export quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other submission failure
    #[error("Provider rejected export task: {0}")]
    Provider(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ArchivistError {
    fn from(err: std::io::Error) -> Self {
        ArchivistError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ArchivistError {
    fn from(err: serde_json::Error) -> Self {
        ArchivistError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ArchivistError {
    fn from(err: toml::de::Error) -> Self {
        ArchivistError::Configuration(format!("TOML parse error: {err}"))
    }
}
