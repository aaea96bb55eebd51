//! Progress store factory
//!
//! This module builds the progress store backend selected in configuration.

use crate::adapters::dynamodb::DynamoDbProgressStore;
use crate::adapters::memory::MemoryProgressStore;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLProgressStore};
use crate::adapters::store::traits::ProgressStorage;
use crate::config::schema::{StoreBackend, StoreConfig};
use crate::domain::{ArchivistError, Result};
use std::sync::Arc;

/// Create a progress store based on the configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements ProgressStorage
///
/// # Errors
///
/// Returns an error if the selected backend has no configuration section or
/// its client cannot be created.
pub async fn create_progress_storage(
    config: &StoreConfig,
) -> Result<Arc<dyn ProgressStorage + Send + Sync>> {
    match config.backend {
        StoreBackend::DynamoDB => {
            let dynamo_config = config.dynamodb.clone().unwrap_or_default();

            tracing::info!(table = %dynamo_config.table_name, "Creating DynamoDB progress store");
            let store = DynamoDbProgressStore::new(&dynamo_config).await?;

            Ok(Arc::new(store) as Arc<dyn ProgressStorage + Send + Sync>)
        }
        StoreBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                ArchivistError::Configuration(
                    "store.postgresql section is required when backend is 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL progress store");
            let client = PostgreSQLClient::new(pg_config.clone())?;
            let store = PostgreSQLProgressStore::new(client);

            Ok(Arc::new(store) as Arc<dyn ProgressStorage + Send + Sync>)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory progress store; progress is lost on exit");
            Ok(Arc::new(MemoryProgressStore::new()) as Arc<dyn ProgressStorage + Send + Sync>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            ..Default::default()
        };

        let storage = create_progress_storage(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_postgresql_backend_requires_section() {
        let config = StoreConfig {
            backend: StoreBackend::PostgreSQL,
            ..Default::default()
        };

        let result = create_progress_storage(&config).await;
        assert!(matches!(result, Err(ArchivistError::Configuration(_))));
    }
}
