//! SNS failure notifier

use crate::adapters::notify::{FailureNotice, FailureNotifier};
use crate::domain::{ArchivistError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::config::Region as SdkRegion;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client;

/// SNS subjects are limited to 100 characters
const MAX_SUBJECT_LEN: usize = 100;

/// Publishes failure notices to one SNS topic
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    /// Create a notifier for `topic_arn`, using the topic's own region
    pub async fn new(topic_arn: &str) -> Result<Self> {
        let region = topic_region(topic_arn).ok_or_else(|| {
            ArchivistError::Configuration(format!("Invalid SNS topic ARN: {topic_arn}"))
        })?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(SdkRegion::new(region.to_string()))
            .load()
            .await;

        Ok(Self {
            client: Client::new(&sdk_config),
            topic_arn: topic_arn.to_string(),
        })
    }
}

#[async_trait]
impl FailureNotifier for SnsNotifier {
    async fn notify(&self, notice: &FailureNotice) -> Result<()> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(truncate_subject(&notice.subject()))
            .message(notice.message())
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Notification(format!(
                    "Failed to publish to {}: {}",
                    self.topic_arn,
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::debug!(topic = %self.topic_arn, "Failure notification published");
        Ok(())
    }
}

/// Region field of `arn:aws:sns:<region>:<account>:<topic>`
pub fn topic_region(arn: &str) -> Option<&str> {
    let mut parts = arn.splitn(6, ':');
    match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some("arn"), Some(_), Some("sns"), Some(region), Some(_), Some(topic))
            if !region.is_empty() && !topic.is_empty() =>
        {
            Some(region)
        }
        _ => None,
    }
}

fn truncate_subject(subject: &str) -> String {
    subject.chars().take(MAX_SUBJECT_LEN).collect()
}
