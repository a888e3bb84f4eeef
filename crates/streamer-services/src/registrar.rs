use chrono::Utc;
use std::sync::Arc;
use streamer_core::{FileRecord, IngestError, UploadMetadata};
use streamer_db::FileRecordRepository;
use uuid::Uuid;

/// Persists the record of an upload before any of its bytes are accepted.
#[derive(Clone)]
pub struct MetadataRegistrar {
    repository: Arc<dyn FileRecordRepository>,
}

impl MetadataRegistrar {
    pub fn new(repository: Arc<dyn FileRecordRepository>) -> Self {
        Self { repository }
    }

    /// Generate an id for the upload and save its record in a single write.
    ///
    /// Not retried on failure.
    #[tracing::instrument(skip(self, metadata), fields(file.name = %metadata.name))]
    pub async fn register(&self, metadata: &UploadMetadata) -> Result<Uuid, IngestError> {
        let record = FileRecord::new(Uuid::new_v4(), metadata, Utc::now());

        self.repository.save(&record).await.map_err(|e| {
            IngestError::Persistence(e.context("failed to save file details on database"))
        })?;

        tracing::debug!(
            upload.id = %record.id,
            content_type = %record.content_type,
            "File details saved"
        );

        Ok(record.id)
    }
}
