//! Log group listing

use crate::adapters::cloudwatch::api::{LogGroupEntry, LogsApi};
use crate::adapters::provider::WorkEnumerator;
use crate::config::ExportConfig;
use crate::domain::{ArchivistError, ExportUnit, LogGroupName, Region, Result};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::sync::Arc;

enum Page {
    First,
    Next(String),
    Last,
}

/// Lists log groups region by region, one DescribeLogGroups page at a time
pub struct CloudWatchEnumerator {
    api: Arc<dyn LogsApi>,
    regions: Vec<Region>,
    name_prefix: Option<String>,
    skip_tag: Option<(String, String)>,
}

impl CloudWatchEnumerator {
    /// Create an enumerator over `regions`, in the given order
    pub fn new(api: Arc<dyn LogsApi>, regions: Vec<Region>, export: &ExportConfig) -> Self {
        let skip_tag = if export.skip_tag_key.trim().is_empty() {
            None
        } else {
            Some((export.skip_tag_key.clone(), export.skip_tag_value.clone()))
        };

        Self {
            api,
            regions,
            name_prefix: export.log_group_prefix.clone(),
            skip_tag,
        }
    }

    fn region_units<'a>(
        &'a self,
        region: &'a Region,
    ) -> impl Stream<Item = Result<ExportUnit>> + Send + 'a {
        stream::try_unfold(Page::First, move |page| async move {
            let token = match page {
                Page::First => None,
                Page::Next(token) => Some(token),
                Page::Last => return Ok::<_, ArchivistError>(None),
            };

            let (units, next_token) = self.list_page(region, token).await?;
            let next = match next_token {
                Some(token) => Page::Next(token),
                None => Page::Last,
            };

            Ok(Some((
                stream::iter(units.into_iter().map(Ok::<_, ArchivistError>)),
                next,
            )))
        })
        .try_flatten()
    }

    async fn list_page(
        &self,
        region: &Region,
        token: Option<String>,
    ) -> Result<(Vec<ExportUnit>, Option<String>)> {
        let page = self
            .api
            .describe_log_groups(region, self.name_prefix.as_deref(), token)
            .await?;

        let mut units = Vec::with_capacity(page.groups.len());
        for group in &page.groups {
            if self.opted_out(region, group).await {
                tracing::debug!(region = %region, log_group = %group.name, "Skipping opted-out log group");
                continue;
            }

            let name = LogGroupName::new(group.name.as_str()).map_err(ArchivistError::Discovery)?;
            units.push(ExportUnit::new(region.clone(), name));
        }

        tracing::debug!(region = %region, count = units.len(), "Listed log group page");

        Ok((units, page.next_token))
    }

    async fn opted_out(&self, region: &Region, group: &LogGroupEntry) -> bool {
        let Some((key, value)) = &self.skip_tag else {
            return false;
        };
        let Some(arn) = &group.arn else {
            return false;
        };

        match self.api.log_group_tags(region, resource_arn(arn)).await {
            Ok(tags) => has_tag(Some(&tags), key, value),
            Err(e) => {
                tracing::warn!(
                    region = %region,
                    log_group = %group.name,
                    error = %e,
                    "Failed to read log group tags, treating as untagged"
                );
                false
            }
        }
    }
}

impl WorkEnumerator for CloudWatchEnumerator {
    fn list_units(&self) -> BoxStream<'_, Result<ExportUnit>> {
        stream::iter(self.regions.iter())
            .flat_map(move |region| self.region_units(region))
            .boxed()
    }
}

/// DescribeLogGroups reports the ARN with a trailing `:*`; the tagging API wants it without
fn resource_arn(arn: &str) -> &str {
    arn.strip_suffix(":*").unwrap_or(arn)
}

fn has_tag(tags: Option<&HashMap<String, String>>, key: &str, value: &str) -> bool {
    tags.and_then(|t| t.get(key))
        .is_some_and(|v| v.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cloudwatch::api::scripted::ScriptedLogs;
    use crate::adapters::cloudwatch::api::LogGroupPage;

    fn region(code: &str) -> Region {
        Region::new(code).unwrap()
    }

    fn group(name: &str) -> LogGroupEntry {
        LogGroupEntry {
            name: name.to_string(),
            arn: Some(format!(
                "arn:aws:logs:us-east-1:123456789012:log-group:{name}:*"
            )),
        }
    }

    fn page(groups: Vec<LogGroupEntry>, next_token: Option<&str>) -> LogGroupPage {
        LogGroupPage {
            groups,
            next_token: next_token.map(str::to_string),
        }
    }

    fn tagged(value: &str) -> HashMap<String, String> {
        HashMap::from([("auto-backup".to_string(), value.to_string())])
    }

    async fn listed(logs: Arc<ScriptedLogs>, regions: &[&str], export: &ExportConfig) -> Result<Vec<String>> {
        let enumerator = CloudWatchEnumerator::new(
            logs,
            regions.iter().map(|r| region(r)).collect(),
            export,
        );
        let units: Vec<ExportUnit> = enumerator.list_units().try_collect().await?;
        Ok(units.iter().map(ToString::to_string).collect())
    }

    fn no_skip_tag() -> ExportConfig {
        ExportConfig {
            skip_tag_key: String::new(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_follows_next_token_across_pages_and_regions() {
        let mut logs = ScriptedLogs::default();
        logs.pages.insert(
            (region("us-east-1"), None),
            page(vec![group("/app/a"), group("/app/b")], Some("t1")),
        );
        logs.pages.insert(
            (region("us-east-1"), Some("t1".to_string())),
            page(vec![group("/app/c")], Some("t2")),
        );
        logs.pages.insert(
            (region("us-east-1"), Some("t2".to_string())),
            page(vec![], None),
        );
        logs.pages.insert(
            (region("eu-west-1"), None),
            page(vec![group("/app/a")], None),
        );
        let logs = Arc::new(logs);

        let units = listed(logs.clone(), &["us-east-1", "eu-west-1"], &no_skip_tag())
            .await
            .unwrap();

        assert_eq!(
            units,
            vec![
                "us-east-1:/app/a",
                "us-east-1:/app/b",
                "us-east-1:/app/c",
                "eu-west-1:/app/a",
            ]
        );
        assert_eq!(
            logs.calls(),
            vec![
                "describe_log_groups us-east-1 None None",
                "describe_log_groups us-east-1 None Some(\"t1\")",
                "describe_log_groups us-east-1 None Some(\"t2\")",
                "describe_log_groups eu-west-1 None None",
            ]
        );
    }

    #[tokio::test]
    async fn test_passes_name_prefix() {
        let mut logs = ScriptedLogs::default();
        logs.pages.insert(
            (region("us-east-1"), None),
            page(vec![group("/aws/lambda/orders")], None),
        );
        let logs = Arc::new(logs);

        let export = ExportConfig {
            log_group_prefix: Some("/aws/lambda/".to_string()),
            ..no_skip_tag()
        };
        listed(logs.clone(), &["us-east-1"], &export).await.unwrap();

        assert_eq!(
            logs.calls(),
            vec!["describe_log_groups us-east-1 Some(\"/aws/lambda/\") None"]
        );
    }

    #[tokio::test]
    async fn test_skips_opted_out_groups() {
        let mut logs = ScriptedLogs::default();
        logs.pages.insert(
            (region("us-east-1"), None),
            page(
                vec![
                    group("/app/keep"),
                    group("/app/optout"),
                    group("/app/denied"),
                    LogGroupEntry {
                        name: "/app/no-arn".to_string(),
                        arn: None,
                    },
                ],
                None,
            ),
        );
        logs.tags.insert(
            "arn:aws:logs:us-east-1:123456789012:log-group:/app/keep".to_string(),
            tagged("yes"),
        );
        logs.tags.insert(
            "arn:aws:logs:us-east-1:123456789012:log-group:/app/optout".to_string(),
            tagged("NO"),
        );
        // No tags scripted for /app/denied, so its lookup fails
        let logs = Arc::new(logs);

        let units = listed(logs.clone(), &["us-east-1"], &ExportConfig::default())
            .await
            .unwrap();

        assert_eq!(
            units,
            vec![
                "us-east-1:/app/keep",
                "us-east-1:/app/denied",
                "us-east-1:/app/no-arn",
            ]
        );
        assert!(logs
            .calls()
            .contains(&"log_group_tags arn:aws:logs:us-east-1:123456789012:log-group:/app/optout".to_string()));
    }

    #[tokio::test]
    async fn test_no_tag_lookups_without_skip_tag() {
        let mut logs = ScriptedLogs::default();
        logs.pages.insert(
            (region("us-east-1"), None),
            page(vec![group("/app/a")], None),
        );
        let logs = Arc::new(logs);

        listed(logs.clone(), &["us-east-1"], &no_skip_tag()).await.unwrap();

        assert!(logs.calls().iter().all(|c| !c.starts_with("log_group_tags")));
    }

    #[tokio::test]
    async fn test_listing_failure_surfaces_as_discovery_error() {
        let mut logs = ScriptedLogs::default();
        logs.pages.insert(
            (region("us-east-1"), None),
            page(vec![group("/app/a")], Some("t1")),
        );
        let logs = Arc::new(logs);

        let err = listed(logs, &["us-east-1"], &no_skip_tag()).await.unwrap_err();
        assert!(matches!(err, ArchivistError::Discovery(_)));
    }

    #[test]
    fn test_resource_arn_strips_wildcard() {
        assert_eq!(
            resource_arn("arn:aws:logs:us-east-1:123456789012:log-group:/app/web:*"),
            "arn:aws:logs:us-east-1:123456789012:log-group:/app/web"
        );
        assert_eq!(resource_arn("arn:aws:logs:x"), "arn:aws:logs:x");
    }

    #[test]
    fn test_has_tag() {
        let tags = tagged("no");

        assert!(has_tag(Some(&tags), "auto-backup", "no"));
        assert!(has_tag(Some(&tags), "auto-backup", "NO"));
        assert!(!has_tag(Some(&tags), "auto-backup", "yes"));
        assert!(!has_tag(Some(&tags), "team", "no"));
        assert!(!has_tag(None, "auto-backup", "no"));
    }
}
