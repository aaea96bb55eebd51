//! CloudWatch Logs integration
//!
//! Implements the provider seams on top of the CloudWatch Logs API:
//! DescribeLogGroups for discovery, DescribeExportTasks for the quota gate and
//! task polling, CreateExportTask for submission.

pub mod api;
pub mod client;
pub mod driver;
pub mod enumerator;
pub mod gate;

pub use api::LogsApi;
pub use client::CloudWatchClients;
pub use driver::CloudWatchExportDriver;
pub use enumerator::CloudWatchEnumerator;
pub use gate::CloudWatchQuotaGate;
