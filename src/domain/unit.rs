//! Export units and archive destinations

use crate::domain::ids::{LogGroupName, Region};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One exportable source: a log group in a region
///
/// Units are produced by the work enumerator and never change once discovered.
/// The pair `(region, name)` is the key of the unit's progress record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportUnit {
    /// Region the log group lives in
    pub region: Region,

    /// Log group name
    pub name: LogGroupName,
}

impl ExportUnit {
    /// Create a new export unit
    pub fn new(region: Region, name: LogGroupName) -> Self {
        Self { region, name }
    }
}

impl fmt::Display for ExportUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.name)
    }
}

/// Where an export task writes its objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDestination {
    /// Bucket name, without any `s3://` scheme
    pub bucket: String,

    /// Key prefix inside the bucket
    pub prefix: String,
}

impl ExportDestination {
    /// Create a destination, stripping an `s3://` scheme and trailing slashes from the bucket
    pub fn new(bucket: impl AsRef<str>, prefix: impl Into<String>) -> Self {
        let bucket = bucket
            .as_ref()
            .trim()
            .trim_start_matches("s3://")
            .trim_end_matches('/')
            .to_string();
        Self {
            bucket,
            prefix: prefix.into(),
        }
    }
}

impl fmt::Display for ExportDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}
