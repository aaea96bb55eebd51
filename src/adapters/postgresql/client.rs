//! PostgreSQL client implementation
//!
//! This module provides the pooled client behind the PostgreSQL progress store.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{ArchivistError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for Archivist
///
/// Provides methods for connecting to PostgreSQL, creating the progress schema,
/// and running statements through a connection pool.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first query. With `ssl_mode = "disable"`
    /// connections are made in plain text; otherwise through native TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed or the pool
    /// cannot be built.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .parse()
            .map_err(|e| {
                ArchivistError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.ssl_mode == "disable" {
            Manager::from_config(pg_config, NoTls, manager_config)
        } else {
            let connector = native_tls::TlsConnector::new().map_err(|e| {
                ArchivistError::Configuration(format!("Failed to initialise TLS: {e}"))
            })?;
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                ArchivistError::Persistence(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| ArchivistError::Persistence(format!("Connection test failed: {e}")))?;

        tracing::info!(
            connection = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Create the progress table and indexes if they don't exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;

        let migration_sql = include_str!("../../../migrations/001_progress_schema.sql");

        client.batch_execute(migration_sql).await.map_err(|e| {
            ArchivistError::Persistence(format!("Failed to execute migration: {e}"))
        })?;

        tracing::info!("PostgreSQL progress schema initialized");
        Ok(())
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            ArchivistError::Persistence(format!("Failed to get connection from pool: {e}"))
        })
    }

    /// Execute a query and return rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        self.set_statement_timeout(&client).await?;

        client
            .query(query, params)
            .await
            .map_err(|e| ArchivistError::Persistence(format!("Query failed: {e}")))
    }

    /// Execute a statement and return the number of affected rows
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        let client = self.get_connection().await?;
        self.set_statement_timeout(&client).await?;

        client
            .execute(statement, params)
            .await
            .map_err(|e| ArchivistError::Persistence(format!("Statement execution failed: {e}")))
    }

    async fn set_statement_timeout(&self, client: &deadpool_postgres::Object) -> Result<()> {
        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.execute(&timeout_query, &[]).await.map_err(|e| {
            ArchivistError::Persistence(format!("Failed to set statement timeout: {e}"))
        })?;
        Ok(())
    }

    /// Get the connection string (without credentials)
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_ref())
    }
}

fn redact_connection_string(connection_string: &str) -> String {
    connection_string
        .rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{host}"))
        .unwrap_or_else(|| "postgresql://***".to_string())
}
