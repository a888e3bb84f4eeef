//! Application state shared by all handlers.

use std::sync::Arc;
use streamer_core::Config;
use streamer_db::FileRecordRepository;
use streamer_services::IngestService;

/// Gateway limits taken from [`Config`]
#[derive(Clone, Debug)]
pub struct UploadLimits {
    /// Size of the data frames an uploaded file is cut into
    pub chunk_size_bytes: usize,
    pub max_upload_bytes: usize,
}

impl From<&Config> for UploadLimits {
    fn from(config: &Config) -> Self {
        Self {
            chunk_size_bytes: config.chunk_size_bytes,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub file_repository: Arc<dyn FileRecordRepository>,
    pub limits: UploadLimits,
}
