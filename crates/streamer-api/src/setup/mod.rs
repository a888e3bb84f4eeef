//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::{AppState, UploadLimits};
use anyhow::{Context, Result};
use std::sync::Arc;
use streamer_core::Config;
use streamer_db::{connect, PgFileRecordRepository};
use streamer_services::IngestService;
use streamer_storage::LocalFileStore;
use tokio_util::sync::CancellationToken;

/// Connect the database and build the router.
///
/// `shutdown` is the parent of every upload writer; cancelling it aborts in-flight uploads.
pub async fn initialize_app(
    config: &Config,
    shutdown: CancellationToken,
) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let pool = connect(config).await?;
    let repository = Arc::new(PgFileRecordRepository::new(pool));

    let ingest = IngestService::new(
        repository.clone(),
        Arc::new(LocalFileStore::new()),
        config.ingest.clone(),
        shutdown,
    );

    tracing::info!(
        upload_root = %config.ingest.upload_root.display(),
        inactivity_timeout_ms = config.ingest.inactivity_timeout.as_millis() as u64,
        "Ingest pipeline ready"
    );

    let state = Arc::new(AppState {
        ingest,
        file_repository: repository,
        limits: UploadLimits::from(config),
    });

    let router = routes::setup_routes(state.clone());
    Ok((state, router))
}
