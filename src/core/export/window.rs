//! Export window and archive key layout

use crate::domain::{ArchivistError, ExportDestination, ExportUnit, Result};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Time range of log events copied by each export task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
    /// Inclusive start
    pub from: DateTime<Utc>,

    /// Exclusive end
    pub to: DateTime<Utc>,
}

impl ExportWindow {
    /// Build a window
    ///
    /// Without overrides the window covers the `days` full UTC days before
    /// `now`'s midnight. Either bound can be pinned explicitly.
    ///
    /// # Examples
    ///
    /// ```
    /// use archivist::core::export::window::ExportWindow;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 5, 0).unwrap();
    /// let window = ExportWindow::resolve(now, 1, None, None).unwrap();
    ///
    /// assert_eq!(window.from, Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
    /// assert_eq!(window.to, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    /// ```
    pub fn resolve(
        now: DateTime<Utc>,
        days: u32,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let midnight = Utc
            .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
            .single()
            .ok_or_else(|| ArchivistError::Validation(format!("Invalid date: {now}")))?;

        let to = end.unwrap_or(midnight);
        let from = start.unwrap_or(to - Duration::days(i64::from(days)));

        if from >= to {
            return Err(ArchivistError::Validation(format!(
                "Export window start {from} must be before end {to}"
            )));
        }

        Ok(Self { from, to })
    }

    /// Start as epoch milliseconds
    pub fn from_millis(&self) -> i64 {
        self.from.timestamp_millis()
    }

    /// End as epoch milliseconds
    pub fn to_millis(&self) -> i64 {
        self.to.timestamp_millis()
    }

    /// Object key prefix for a unit
    ///
    /// `{base}/{log group without leading '/'}/year=YYYY/month=MM/day=DD`, dated by
    /// the window start.
    pub fn key_prefix(&self, base: &str, unit: &ExportUnit) -> String {
        let base = base.trim_matches('/');
        let date = format!(
            "year={}/month={:02}/day={:02}",
            self.from.year(),
            self.from.month(),
            self.from.day()
        );

        if base.is_empty() {
            format!("{}/{}", unit.name.path_segment(), date)
        } else {
            format!("{}/{}/{}", base, unit.name.path_segment(), date)
        }
    }

    /// Destination for a unit inside `bucket`
    pub fn destination(&self, bucket: &str, base: &str, unit: &ExportUnit) -> ExportDestination {
        ExportDestination::new(bucket, self.key_prefix(base, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LogGroupName, Region};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn unit() -> ExportUnit {
        ExportUnit::new(
            Region::new("us-west-2").unwrap(),
            LogGroupName::new("/aws/lambda/orders").unwrap(),
        )
    }

    #[test]
    fn test_default_window_is_previous_day() {
        let window = ExportWindow::resolve(at(2024, 1, 1, 13), 1, None, None).unwrap();
        assert_eq!(window.from, at(2023, 12, 31, 0));
        assert_eq!(window.to, at(2024, 1, 1, 0));
        assert_eq!(window.to_millis() - window.from_millis(), 86_400_000);
    }

    #[test]
    fn test_multi_day_window() {
        let window = ExportWindow::resolve(at(2024, 3, 10, 0), 7, None, None).unwrap();
        assert_eq!(window.from, at(2024, 3, 3, 0));
    }

    #[test]
    fn test_explicit_bounds() {
        let window =
            ExportWindow::resolve(at(2024, 3, 10, 0), 1, Some(at(2024, 2, 1, 6)), None).unwrap();
        assert_eq!(window.from, at(2024, 2, 1, 6));
        assert_eq!(window.to, at(2024, 3, 10, 0));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let result = ExportWindow::resolve(
            at(2024, 3, 10, 0),
            1,
            Some(at(2024, 3, 5, 0)),
            Some(at(2024, 3, 4, 0)),
        );
        assert!(matches!(result, Err(ArchivistError::Validation(_))));
    }

    #[test]
    fn test_key_prefix() {
        let window = ExportWindow::resolve(at(2024, 3, 10, 0), 1, None, None).unwrap();
        assert_eq!(
            window.key_prefix("exportedlogs/", &unit()),
            "exportedlogs/aws/lambda/orders/year=2024/month=03/day=09"
        );
        assert_eq!(
            window.key_prefix("", &unit()),
            "aws/lambda/orders/year=2024/month=03/day=09"
        );
    }

    #[test]
    fn test_destination() {
        let window = ExportWindow::resolve(at(2024, 3, 10, 0), 1, None, None).unwrap();
        let dest = window.destination("s3://archive", "exportedlogs", &unit());
        assert_eq!(dest.bucket, "archive");
        assert!(dest.prefix.starts_with("exportedlogs/aws/lambda/orders/"));
    }
}
