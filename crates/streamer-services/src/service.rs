use std::sync::Arc;
use streamer_core::IngestConfig;
use streamer_db::FileRecordRepository;
use streamer_storage::FileStore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::coordinator::IngestCoordinator;
use crate::registrar::MetadataRegistrar;
use crate::transport::{self, UploadClient};

/// Frames a client may queue ahead of its coordinator
const TRANSPORT_BUFFER: usize = 1;

/// Entry point for uploads.
///
/// Every upload runs on its own coordinator task; uploads share nothing but the store,
/// the repository and the shutdown token.
#[derive(Clone)]
pub struct IngestService {
    coordinator: Arc<IngestCoordinator>,
    shutdown: CancellationToken,
}

impl IngestService {
    pub fn new(
        repository: Arc<dyn FileRecordRepository>,
        store: Arc<dyn FileStore>,
        config: IngestConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let coordinator = IngestCoordinator::new(
            MetadataRegistrar::new(repository),
            store,
            config,
            shutdown.clone(),
        );

        Self {
            coordinator: Arc::new(coordinator),
            shutdown,
        }
    }

    /// Open a new upload stream and start its coordinator.
    pub fn open_upload(&self) -> UploadClient {
        let (client, mut server) = transport::channel(TRANSPORT_BUFFER);
        let coordinator = self.coordinator.clone();

        let span = tracing::info_span!("upload");
        tokio::spawn(
            async move {
                // The outcome was already sent to the client.
                let _ = coordinator.handle(&mut server).await;
            }
            .instrument(span),
        );

        client
    }

    /// Stop all in-flight writers.
    pub fn shutdown(&self) {
        tracing::info!("Cancelling in-flight uploads");
        self.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
