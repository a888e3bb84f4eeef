//! In-memory repository used by tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use streamer_core::FileRecord;
use uuid::Uuid;

use super::FileRecordRepository;

#[derive(Clone, Default)]
pub struct InMemoryFileRecordRepository {
    records: Arc<Mutex<HashMap<Uuid, FileRecord>>>,
    failure: Option<String>,
}

impl InMemoryFileRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose every `save` fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            records: Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.records
            .lock()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FileRecordRepository for InMemoryFileRecordRepository {
    async fn save(&self, record: &FileRecord) -> anyhow::Result<()> {
        if let Some(message) = &self.failure {
            return Err(anyhow::anyhow!("{}", message));
        }

        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("record store poisoned"))?;
        if records.contains_key(&record.id) {
            return Err(anyhow::anyhow!("duplicate file id {}", record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<FileRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("record store poisoned"))?;
        Ok(records.get(&id).cloned())
    }
}
