//! Per-region CloudWatch Logs clients

use crate::domain::{ArchivistError, Region, Result};
use aws_config::BehaviorVersion;
use aws_sdk_cloudwatchlogs::config::Region as SdkRegion;
use aws_sdk_cloudwatchlogs::Client;
use std::collections::HashMap;

/// CloudWatch Logs clients, one per configured region
///
/// Credentials come from the default provider chain (environment, profile,
/// instance or task role).
#[derive(Debug, Clone)]
pub struct CloudWatchClients {
    clients: HashMap<Region, Client>,
}

impl CloudWatchClients {
    /// Build a client for every region
    pub async fn connect(regions: &[Region]) -> Self {
        let mut clients = HashMap::new();

        for region in regions {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .region(SdkRegion::new(region.to_string()))
                .load()
                .await;
            clients.insert(region.clone(), Client::new(&sdk_config));

            tracing::debug!(region = %region, "CloudWatch Logs client created");
        }

        Self { clients }
    }

    /// Client for a region
    pub fn get(&self, region: &Region) -> Result<&Client> {
        self.clients.get(region).ok_or_else(|| {
            ArchivistError::Configuration(format!("Region {region} is not configured"))
        })
    }
}
