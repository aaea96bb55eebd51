//! PostgreSQL row models
//!
//! This module maps progress records onto the `export_progress` table.

use crate::core::state::record::{ExportStatus, ProgressRecord};
use crate::domain::{ArchivistError, JobHandle, LogGroupName, Region, Result};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use tokio_postgres::Row;

/// Row of the `export_progress` table
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLProgressRow {
    pub region: String,
    pub name: String,
    pub status: String,
    pub task_id: Option<String>,
    /// INTEGER column; attempts never approach i32::MAX
    pub attempts: i32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PostgreSQLProgressRow {
    /// Convert from a domain record
    pub fn from_domain(record: &ProgressRecord) -> Self {
        Self {
            region: record.region.to_string(),
            name: record.name.to_string(),
            status: record.status.as_str().to_string(),
            task_id: record.job_handle.as_ref().map(|h| h.to_string()),
            attempts: i32::try_from(record.attempts).unwrap_or(i32::MAX),
            submitted_at: record.submitted_at,
            finished_at: record.finished_at,
            last_error: record.last_error.clone(),
            updated_at: record.updated_at,
        }
    }

    /// Read a row returned by `SELECT *`
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            region: try_get(row, "region")?,
            name: try_get(row, "name")?,
            status: try_get(row, "status")?,
            task_id: try_get(row, "task_id")?,
            attempts: try_get(row, "attempts")?,
            submitted_at: try_get(row, "submitted_at")?,
            finished_at: try_get(row, "finished_at")?,
            last_error: try_get(row, "last_error")?,
            updated_at: try_get(row, "updated_at")?,
        })
    }

    /// Convert to a domain record
    pub fn to_domain(&self) -> Result<ProgressRecord> {
        let region = Region::new(self.region.clone()).map_err(malformed)?;
        let name = LogGroupName::new(self.name.clone()).map_err(malformed)?;
        let status = ExportStatus::from_str(&self.status).map_err(malformed)?;
        let job_handle = self
            .task_id
            .clone()
            .map(JobHandle::new)
            .transpose()
            .map_err(malformed)?;

        Ok(ProgressRecord {
            region,
            name,
            status,
            job_handle,
            attempts: u32::try_from(self.attempts)
                .map_err(|_| malformed(format!("negative attempts: {}", self.attempts)))?,
            submitted_at: self.submitted_at,
            finished_at: self.finished_at,
            last_error: self.last_error.clone(),
            updated_at: self.updated_at,
        })
    }
}

fn try_get<'a, T: tokio_postgres::types::FromSql<'a>>(row: &'a Row, column: &str) -> Result<T> {
    row.try_get(column)
        .map_err(|e| ArchivistError::Persistence(format!("Failed to read column {column}: {e}")))
}

fn malformed(message: String) -> ArchivistError {
    ArchivistError::Persistence(format!("Malformed progress row: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::record::ProgressRecordBuilder;

    #[test]
    fn test_row_from_domain() {
        let record = ProgressRecordBuilder::new(
            Region::new("eu-central-1").unwrap(),
            LogGroupName::new("/aws/rds/cluster/main").unwrap(),
        )
        .status(ExportStatus::Failed)
        .job_handle(JobHandle::new("0b7c").unwrap())
        .attempts(3)
        .last_error("CANCELLED")
        .build();

        let row = PostgreSQLProgressRow::from_domain(&record);
        assert_eq!(row.status, "FAILED");
        assert_eq!(row.task_id.as_deref(), Some("0b7c"));
        assert_eq!(row.attempts, 3);

        assert_eq!(row.to_domain().unwrap(), record);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let row = PostgreSQLProgressRow {
            region: "us-east-1".to_string(),
            name: "/app".to_string(),
            status: "ARCHIVED".to_string(),
            task_id: None,
            attempts: 0,
            submitted_at: None,
            finished_at: None,
            last_error: None,
            updated_at: Utc::now(),
        };

        assert!(matches!(row.to_domain(), Err(ArchivistError::Persistence(_))));
    }

    #[test]
    fn test_negative_attempts_are_rejected() {
        let row = PostgreSQLProgressRow {
            region: "us-east-1".to_string(),
            name: "/app".to_string(),
            status: "PENDING".to_string(),
            task_id: None,
            attempts: -1,
            submitted_at: None,
            finished_at: None,
            last_error: None,
            updated_at: Utc::now(),
        };

        assert!(row.to_domain().is_err());
    }
}
