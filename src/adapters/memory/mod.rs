//! In-memory progress store
//!
//! Records live for the lifetime of the process. Used for dry runs and tests.

use crate::adapters::store::traits::ProgressStorage;
use crate::core::state::record::ProgressRecord;
use crate::domain::ids::{LogGroupName, Region};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Non-durable progress store
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: RwLock<BTreeMap<(Region, LogGroupName), ProgressRecord>>,
}

impl MemoryProgressStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = ProgressRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| ((r.region.clone(), r.name.clone()), r))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProgressStorage for MemoryProgressStore {
    async fn load_record(
        &self,
        region: &Region,
        name: &LogGroupName,
    ) -> Result<Option<ProgressRecord>> {
        let key = (region.clone(), name.clone());
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn save_record(&self, record: &ProgressRecord) -> Result<()> {
        let key = (record.region.clone(), record.name.clone());
        self.records.write().await.insert(key, record.clone());
        Ok(())
    }

    async fn list_records(&self) -> Result<Vec<ProgressRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
