//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers an export run deals with. Each type keeps
//! region names, log group names and export task ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AWS region newtype wrapper
///
/// # Examples
///
/// ```
/// use archivist::domain::ids::Region;
/// use std::str::FromStr;
///
/// let region = Region::from_str("ap-northeast-1").unwrap();
/// assert_eq!(region.as_str(), "ap-northeast-1");
/// assert!(Region::from_str("Tokyo").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Creates a new Region from a string
    ///
    /// Region codes are lowercase ASCII letters, digits and hyphens
    /// (`us-east-1`, `eu-central-2`, `us-gov-west-1`).
    pub fn new(region: impl Into<String>) -> Result<Self, String> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err("Region cannot be empty".to_string());
        }

        let valid = region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid || !region.contains('-') || region.starts_with('-') || region.ends_with('-') {
            return Err(format!("Invalid region code: {region}"));
        }

        Ok(Self(region))
    }

    /// Returns the region as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Region {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// CloudWatch log group name newtype wrapper
///
/// Log group names are 1-512 characters long.
///
/// # Examples
///
/// ```
/// use archivist::domain::ids::LogGroupName;
/// use std::str::FromStr;
///
/// let name = LogGroupName::from_str("/aws/lambda/orders").unwrap();
/// assert_eq!(name.path_segment(), "aws/lambda/orders");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogGroupName(String);

impl LogGroupName {
    /// Maximum length accepted by CloudWatch Logs
    pub const MAX_LEN: usize = 512;

    /// Creates a new LogGroupName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Log group name cannot be empty".to_string());
        }
        if name.len() > Self::MAX_LEN {
            return Err(format!(
                "Log group name exceeds {} characters: {}",
                Self::MAX_LEN,
                name
            ));
        }
        Ok(Self(name))
    }

    /// Returns the log group name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without its leading slash, for use inside an S3 key
    pub fn path_segment(&self) -> &str {
        self.0.trim_start_matches('/')
    }
}

impl fmt::Display for LogGroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogGroupName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LogGroupName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LogGroupName> for String {
    fn from(name: LogGroupName) -> Self {
        name.0
    }
}

impl AsRef<str> for LogGroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque export task identifier returned by the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobHandle(String);

impl JobHandle {
    /// Creates a new JobHandle from a string
    pub fn new(handle: impl Into<String>) -> Result<Self, String> {
        let handle = handle.into();
        if handle.trim().is_empty() {
            return Err("Job handle cannot be empty".to_string());
        }
        Ok(Self(handle))
    }

    /// Returns the handle as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for JobHandle {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JobHandle> for String {
    fn from(handle: JobHandle) -> Self {
        handle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("us-east-1" ; "standard")]
    #[test_case("ap-northeast-1" ; "asia pacific")]
    #[test_case("us-gov-west-1" ; "govcloud")]
    fn test_region_valid(code: &str) {
        assert_eq!(Region::new(code).unwrap().as_str(), code);
    }

    #[test_case("" ; "empty")]
    #[test_case("US-EAST-1" ; "uppercase")]
    #[test_case("useast1" ; "no separator")]
    #[test_case("us east 1" ; "whitespace")]
    #[test_case("-us-east-1" ; "leading hyphen")]
    fn test_region_invalid(code: &str) {
        assert!(Region::new(code).is_err());
    }

    #[test]
    fn test_log_group_name_path_segment() {
        let name = LogGroupName::new("/aws/lambda/orders").unwrap();
        assert_eq!(name.path_segment(), "aws/lambda/orders");

        let bare = LogGroupName::new("application").unwrap();
        assert_eq!(bare.path_segment(), "application");
    }

    #[test]
    fn test_log_group_name_too_long() {
        let name = "a".repeat(LogGroupName::MAX_LEN + 1);
        assert!(LogGroupName::new(name).is_err());
    }

    #[test]
    fn test_job_handle_empty() {
        assert!(JobHandle::new("  ").is_err());
        assert_eq!(JobHandle::new("abc-123").unwrap().to_string(), "abc-123");
    }

    #[test]
    fn test_region_serde_rejects_invalid() {
        let ok: Region = serde_json::from_str("\"eu-west-1\"").unwrap();
        assert_eq!(ok.as_str(), "eu-west-1");

        let bad = serde_json::from_str::<Region>("\"EU\"");
        assert!(bad.is_err());
    }
}
