//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable log levels
//! - JSON log files with daily, hourly or no rotation
//! - Field-consistent macros for export lifecycle events
//!
//! # Example
//!
//! ```no_run
//! use archivist::logging::init_logging;
//! use archivist::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log an accepted export task submission
///
/// # Example
///
/// ```no_run
/// use archivist::log_unit_submitted;
/// use archivist::domain::{ExportDestination, ExportUnit, JobHandle, LogGroupName, Region};
///
/// let unit = ExportUnit::new(
///     Region::new("us-east-1").unwrap(),
///     LogGroupName::new("/aws/lambda/orders").unwrap(),
/// );
/// let handle = JobHandle::new("7a1c").unwrap();
/// let destination = ExportDestination::new("log-archive", "exportedlogs/aws/lambda/orders");
/// log_unit_submitted!(&unit, &handle, &destination);
/// ```
#[macro_export]
macro_rules! log_unit_submitted {
    ($unit:expr, $handle:expr, $destination:expr) => {
        tracing::info!(
            region = %$unit.region,
            log_group = %$unit.name,
            task_id = %$handle,
            destination = %$destination,
            "Export task submitted"
        );
    };
}

/// Log an export task reaching a terminal state
#[macro_export]
macro_rules! log_unit_finished {
    ($unit:expr, $handle:expr, $state:expr) => {
        tracing::info!(
            region = %$unit.region,
            log_group = %$unit.name,
            task_id = %$handle,
            state = %$state,
            "Export task finished"
        );
    };
}

/// Log an orchestrator phase transition
#[macro_export]
macro_rules! log_phase {
    ($run_id:expr, $phase:expr) => {
        tracing::debug!(run_id = %$run_id, phase = %$phase, "Entering phase");
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use archivist::log_error_with_context;
/// use archivist::domain::ArchivistError;
///
/// let error = ArchivistError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        ArchivistError, ExportDestination, ExportUnit, JobHandle, JobState, LogGroupName, Region,
    };

    #[test]
    fn test_macros_accept_domain_types() {
        let unit = ExportUnit::new(
            Region::new("us-east-1").unwrap(),
            LogGroupName::new("/app/web").unwrap(),
        );
        let handle = JobHandle::new("abc").unwrap();
        let destination = ExportDestination::new("bucket", "prefix");

        log_unit_submitted!(&unit, &handle, &destination);
        log_unit_finished!(&unit, &handle, JobState::Completed);
        log_phase!("run-1", "DISCOVER");
        log_error_with_context!(
            ArchivistError::Discovery("throttled".to_string()),
            "listing log groups"
        );
    }
}
