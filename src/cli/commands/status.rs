//! Status command implementation
//!
//! This module implements the `status` command for listing stored progress records.

use crate::adapters::store::create_progress_storage;
use crate::config::load_config;
use crate::core::state::{ExportStatus, ProgressManager, ProgressRecord};
use clap::Args;
use std::str::FromStr;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Filter by region
    #[arg(long)]
    pub region: Option<String>,

    /// Filter by status (pending, in_progress, completed, failed)
    #[arg(long)]
    pub status: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking export status");

        let status_filter = match self.status.as_deref().map(ExportStatus::from_str).transpose() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Invalid --status: {e}");
                return Ok(2);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let storage = match create_progress_storage(&config.store).await {
            Ok(s) => s,
            Err(e) => {
                println!("Failed to connect to progress store");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        let progress = ProgressManager::new_with_storage(storage);

        let records = match progress.list_records().await {
            Ok(r) => r,
            Err(e) => {
                println!("Failed to load progress records");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if records.is_empty() {
            println!("No export history found.");
            println!("Run 'archivist run' to start exporting log groups.");
            return Ok(0);
        }

        let filtered = self.filter(&records, status_filter);
        if filtered.is_empty() {
            println!("No progress records match the specified filters.");
            return Ok(0);
        }

        println!("Found {} record(s):", filtered.len());
        println!();
        println!(
            "{:<16} {:<48} {:<12} {:<38} {:<8} {:<20}",
            "Region", "Log Group", "Status", "Task ID", "Attempts", "Updated"
        );
        println!("{}", "-".repeat(146));

        for record in filtered {
            println!(
                "{:<16} {:<48} {:<12} {:<38} {:<8} {:<20}",
                record.region.as_str(),
                record.name.as_str(),
                record.status.as_str(),
                record
                    .job_handle
                    .as_ref()
                    .map(|h| h.as_str())
                    .unwrap_or("-"),
                record.attempts,
                record.updated_at.format("%Y-%m-%d %H:%M:%S"),
            );
            if let Some(error) = &record.last_error {
                println!("{:<16} last error: {error}", "");
            }
        }

        println!();
        Ok(0)
    }

    fn filter<'a>(
        &self,
        records: &'a [ProgressRecord],
        status: Option<ExportStatus>,
    ) -> Vec<&'a ProgressRecord> {
        records
            .iter()
            .filter(|r| self.region.as_deref().map_or(true, |want| r.region.as_str() == want))
            .filter(|r| status.map_or(true, |want| r.status == want))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ProgressRecordBuilder;
    use crate::domain::{LogGroupName, Region};

    fn record(region: &str, name: &str, status: ExportStatus) -> ProgressRecord {
        ProgressRecordBuilder::new(Region::new(region).unwrap(), LogGroupName::new(name).unwrap())
            .status(status)
            .build()
    }

    #[test]
    fn test_status_args_defaults() {
        let args = StatusArgs::default();
        assert!(args.region.is_none());
        assert!(args.status.is_none());
    }

    #[test]
    fn test_filter_by_region_and_status() {
        let records = vec![
            record("us-east-1", "/a", ExportStatus::Completed),
            record("us-east-1", "/b", ExportStatus::Failed),
            record("eu-west-1", "/c", ExportStatus::Failed),
        ];

        let args = StatusArgs {
            region: Some("us-east-1".to_string()),
            status: None,
        };
        assert_eq!(args.filter(&records, None).len(), 2);
        assert_eq!(args.filter(&records, Some(ExportStatus::Failed)).len(), 1);

        let all = StatusArgs::default();
        assert_eq!(all.filter(&records, Some(ExportStatus::Failed)).len(), 2);
    }
}
