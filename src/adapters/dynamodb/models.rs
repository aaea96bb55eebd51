//! DynamoDB item mapping for progress records
//!
//! Items keep the attribute names of the existing export table: partition key
//! `Region`, sort key `Name`, status in `ItemStatus`, export task id in `TaskId`.

use crate::core::state::record::{ExportStatus, ProgressRecord};
use crate::domain::{ArchivistError, JobHandle, LogGroupName, Region, Result};
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::str::FromStr;

pub const ATTR_REGION: &str = "Region";
pub const ATTR_NAME: &str = "Name";
pub const ATTR_STATUS: &str = "ItemStatus";
pub const ATTR_TASK_ID: &str = "TaskId";
pub const ATTR_ATTEMPTS: &str = "Attempts";
pub const ATTR_SUBMITTED_AT: &str = "SubmittedAt";
pub const ATTR_FINISHED_AT: &str = "FinishedAt";
pub const ATTR_LAST_ERROR: &str = "LastError";
pub const ATTR_UPDATED_AT: &str = "UpdatedAt";

/// Primary key of a record
pub fn key(region: &Region, name: &LogGroupName) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (ATTR_REGION.to_string(), AttributeValue::S(region.to_string())),
        (ATTR_NAME.to_string(), AttributeValue::S(name.to_string())),
    ])
}

/// Convert a record into a DynamoDB item
pub fn to_item(record: &ProgressRecord) -> HashMap<String, AttributeValue> {
    let mut item = key(&record.region, &record.name);
    item.insert(
        ATTR_STATUS.to_string(),
        AttributeValue::S(record.status.as_str().to_string()),
    );
    item.insert(
        ATTR_ATTEMPTS.to_string(),
        AttributeValue::N(record.attempts.to_string()),
    );
    item.insert(
        ATTR_UPDATED_AT.to_string(),
        AttributeValue::S(record.updated_at.to_rfc3339()),
    );

    if let Some(handle) = &record.job_handle {
        item.insert(ATTR_TASK_ID.to_string(), AttributeValue::S(handle.to_string()));
    }
    if let Some(ts) = record.submitted_at {
        item.insert(ATTR_SUBMITTED_AT.to_string(), AttributeValue::S(ts.to_rfc3339()));
    }
    if let Some(ts) = record.finished_at {
        item.insert(ATTR_FINISHED_AT.to_string(), AttributeValue::S(ts.to_rfc3339()));
    }
    if let Some(error) = &record.last_error {
        item.insert(ATTR_LAST_ERROR.to_string(), AttributeValue::S(error.clone()));
    }

    item
}

/// Convert a DynamoDB item into a record
///
/// Items written by older tooling may only carry `Region`, `Name` and `ItemStatus`;
/// missing optional attributes default.
pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<ProgressRecord> {
    let region = Region::new(required_string(item, ATTR_REGION)?).map_err(malformed)?;
    let name = LogGroupName::new(required_string(item, ATTR_NAME)?).map_err(malformed)?;
    let status = ExportStatus::from_str(&required_string(item, ATTR_STATUS)?).map_err(malformed)?;

    let job_handle = optional_string(item, ATTR_TASK_ID)
        .map(JobHandle::new)
        .transpose()
        .map_err(malformed)?;

    let attempts = match item.get(ATTR_ATTEMPTS) {
        Some(AttributeValue::N(n)) => n
            .parse::<u32>()
            .map_err(|e| malformed(format!("{ATTR_ATTEMPTS}: {e}")))?,
        _ => 0,
    };

    Ok(ProgressRecord {
        region,
        name,
        status,
        job_handle,
        attempts,
        submitted_at: optional_time(item, ATTR_SUBMITTED_AT)?,
        finished_at: optional_time(item, ATTR_FINISHED_AT)?,
        last_error: optional_string(item, ATTR_LAST_ERROR),
        updated_at: optional_time(item, ATTR_UPDATED_AT)?.unwrap_or_else(Utc::now),
    })
}

fn malformed(message: String) -> ArchivistError {
    ArchivistError::Persistence(format!("Malformed progress item: {message}"))
}

fn required_string(item: &HashMap<String, AttributeValue>, attr: &str) -> Result<String> {
    optional_string(item, attr).ok_or_else(|| malformed(format!("missing attribute {attr}")))
}

fn optional_string(item: &HashMap<String, AttributeValue>, attr: &str) -> Option<String> {
    match item.get(attr) {
        Some(AttributeValue::S(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn optional_time(
    item: &HashMap<String, AttributeValue>,
    attr: &str,
) -> Result<Option<DateTime<Utc>>> {
    optional_string(item, attr)
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|e| malformed(format!("{attr}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::record::ProgressRecordBuilder;

    #[test]
    fn test_item_keeps_table_attribute_names() {
        let record = ProgressRecordBuilder::new(
            Region::new("ap-southeast-2").unwrap(),
            LogGroupName::new("/ecs/api").unwrap(),
        )
        .status(ExportStatus::InProgress)
        .job_handle(JobHandle::new("f1e2d3").unwrap())
        .attempts(2)
        .build();

        let item = to_item(&record);
        assert_eq!(item.get("Region"), Some(&AttributeValue::S("ap-southeast-2".into())));
        assert_eq!(item.get("ItemStatus"), Some(&AttributeValue::S("IN_PROGRESS".into())));
        assert_eq!(item.get("TaskId"), Some(&AttributeValue::S("f1e2d3".into())));
        assert!(!item.contains_key("LastError"));

        let back = from_item(&item).unwrap();
        assert_eq!(back.status, ExportStatus::InProgress);
        assert_eq!(back.attempts, 2);
        assert_eq!(back.job_handle, record.job_handle);
    }

    #[test]
    fn test_minimal_legacy_item() {
        let item = HashMap::from([
            ("Region".to_string(), AttributeValue::S("us-east-1".into())),
            ("Name".to_string(), AttributeValue::S("/app/web".into())),
            ("ItemStatus".to_string(), AttributeValue::S("PENDING".into())),
        ]);

        let record = from_item(&item).unwrap();
        assert_eq!(record.status, ExportStatus::Pending);
        assert_eq!(record.attempts, 0);
        assert!(record.job_handle.is_none());
    }

    #[test]
    fn test_missing_status_is_rejected() {
        let item = HashMap::from([
            ("Region".to_string(), AttributeValue::S("us-east-1".into())),
            ("Name".to_string(), AttributeValue::S("/app/web".into())),
        ]);

        assert!(matches!(from_item(&item), Err(ArchivistError::Persistence(_))));
    }
}
