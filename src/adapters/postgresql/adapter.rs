//! PostgreSQL progress store
//!
//! This module implements [`ProgressStorage`] on top of the `export_progress` table.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::PostgreSQLProgressRow;
use crate::adapters::store::traits::ProgressStorage;
use crate::core::state::record::ProgressRecord;
use crate::domain::ids::{LogGroupName, Region};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// PostgreSQL implementation of [`ProgressStorage`]
pub struct PostgreSQLProgressStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLProgressStore {
    /// Create a new PostgreSQL progress store
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl ProgressStorage for PostgreSQLProgressStore {
    async fn load_record(
        &self,
        region: &Region,
        name: &LogGroupName,
    ) -> Result<Option<ProgressRecord>> {
        tracing::debug!(
            region = %region,
            log_group = %name,
            "Loading progress record from PostgreSQL"
        );

        let query = "SELECT * FROM export_progress WHERE region = $1 AND name = $2";
        let rows = self
            .client
            .query(query, &[&region.as_str(), &name.as_str()])
            .await?;

        rows.first()
            .map(|row| PostgreSQLProgressRow::from_row(row)?.to_domain())
            .transpose()
    }

    async fn save_record(&self, record: &ProgressRecord) -> Result<()> {
        tracing::debug!(
            region = %record.region,
            log_group = %record.name,
            status = %record.status,
            "Saving progress record to PostgreSQL"
        );

        let row = PostgreSQLProgressRow::from_domain(record);

        let upsert_query = r#"
            INSERT INTO export_progress (
                region, name, status, task_id, attempts,
                submitted_at, finished_at, last_error, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (region, name) DO UPDATE SET
                status = EXCLUDED.status,
                task_id = EXCLUDED.task_id,
                attempts = EXCLUDED.attempts,
                submitted_at = EXCLUDED.submitted_at,
                finished_at = EXCLUDED.finished_at,
                last_error = EXCLUDED.last_error,
                updated_at = EXCLUDED.updated_at
        "#;

        self.client
            .execute(
                upsert_query,
                &[
                    &row.region,
                    &row.name,
                    &row.status,
                    &row.task_id,
                    &row.attempts,
                    &row.submitted_at,
                    &row.finished_at,
                    &row.last_error,
                    &row.updated_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<ProgressRecord>> {
        let query = "SELECT * FROM export_progress ORDER BY region, name";
        let rows = self.client.query(query, &[]).await?;

        let records = rows
            .iter()
            .map(|row| PostgreSQLProgressRow::from_row(row)?.to_domain())
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = records.len(), "Loaded progress records from PostgreSQL");
        Ok(records)
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}
