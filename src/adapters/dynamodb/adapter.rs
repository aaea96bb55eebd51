//! DynamoDB progress store

use crate::adapters::dynamodb::models::{self, ATTR_NAME, ATTR_REGION};
use crate::adapters::store::traits::ProgressStorage;
use crate::config::schema::DynamoDbConfig;
use crate::core::state::record::ProgressRecord;
use crate::domain::{ArchivistError, LogGroupName, Region, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region as SdkRegion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use std::time::Duration;

/// Progress store on a DynamoDB table
///
/// Reads are strongly consistent so a read after a write from this process always
/// observes it.
pub struct DynamoDbProgressStore {
    client: Client,
    table_name: String,
}

impl DynamoDbProgressStore {
    /// Create a store from configuration
    pub async fn new(config: &DynamoDbConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(SdkRegion::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(table = %config.table_name, "DynamoDB progress store initialized");

        Ok(Self::with_client(
            Client::from_conf(builder.build()),
            config.table_name.clone(),
        ))
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table_status(&self) -> Result<Option<TableStatus>> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(output) => Ok(output.table().and_then(|t| t.table_status()).cloned()),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                Ok(None)
            }
            Err(e) => Err(ArchivistError::Persistence(format!(
                "Failed to describe table {}: {}",
                self.table_name,
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn create_table(&self) -> Result<()> {
        let attribute = |name: &str| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
        };
        let key = |name: &str, key_type: KeyType| {
            KeySchemaElement::builder()
                .attribute_name(name)
                .key_type(key_type)
                .build()
        };
        let to_err = |e: aws_sdk_dynamodb::error::BuildError| {
            ArchivistError::Persistence(format!("Invalid table definition: {e}"))
        };

        self.client
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(attribute(ATTR_REGION).map_err(to_err)?)
            .attribute_definitions(attribute(ATTR_NAME).map_err(to_err)?)
            .key_schema(key(ATTR_REGION, KeyType::Hash).map_err(to_err)?)
            .key_schema(key(ATTR_NAME, KeyType::Range).map_err(to_err)?)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Persistence(format!(
                    "Failed to create table {}: {}",
                    self.table_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}

#[async_trait]
impl ProgressStorage for DynamoDbProgressStore {
    async fn load_record(
        &self,
        region: &Region,
        name: &LogGroupName,
    ) -> Result<Option<ProgressRecord>> {
        tracing::debug!(region = %region, log_group = %name, "Loading progress record from DynamoDB");

        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(models::key(region, name)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Persistence(format!(
                    "Failed to read progress for {region}:{name}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        output.item().map(models::from_item).transpose()
    }

    async fn save_record(&self, record: &ProgressRecord) -> Result<()> {
        tracing::debug!(
            region = %record.region,
            log_group = %record.name,
            status = %record.status,
            "Saving progress record to DynamoDB"
        );

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(models::to_item(record)))
            .send()
            .await
            .map_err(|e| {
                ArchivistError::Persistence(format!(
                    "Failed to write progress for {}: {}",
                    record.id(),
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<ProgressRecord>> {
        let mut records = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .consistent_read(true)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| {
                    ArchivistError::Persistence(format!(
                        "Failed to scan table {}: {}",
                        self.table_name,
                        DisplayErrorContext(&e)
                    ))
                })?;

            for item in output.items() {
                records.push(models::from_item(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        records.sort_by(|a, b| (&a.region, &a.name).cmp(&(&b.region, &b.name)));
        Ok(records)
    }

    async fn test_connection(&self) -> Result<()> {
        match self.table_status().await? {
            Some(_) => {
                tracing::info!(table = %self.table_name, "DynamoDB connection test successful");
                Ok(())
            }
            None => Err(ArchivistError::Persistence(format!(
                "Table {} does not exist",
                self.table_name
            ))),
        }
    }

    async fn ensure_schema(&self) -> Result<()> {
        if self.table_status().await?.is_none() {
            tracing::info!(table = %self.table_name, "Creating progress table");
            self.create_table().await?;
        }

        for _ in 0..30 {
            if self.table_status().await? == Some(TableStatus::Active) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        Err(ArchivistError::Persistence(format!(
            "Table {} did not become active",
            self.table_name
        )))
    }

    fn backend_name(&self) -> &str {
        "dynamodb"
    }
}
