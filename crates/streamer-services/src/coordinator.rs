//! Ingest coordinator
//!
//! Drives one upload: metadata first, then chunks relayed to a [`StreamWriter`] until the
//! caller ends the stream. Exactly one reply is sent per upload.

use std::sync::Arc;
use streamer_core::validation::{validate_upload_metadata, METADATA_REQUIRED_FIRST};
use streamer_core::{ErrorResponse, Frame, IngestConfig, IngestError, UploadResponse};
use streamer_storage::FileStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::registrar::MetadataRegistrar;
use crate::transport::UploadTransport;
use crate::writer::{StreamWriter, WriterHandle, WriterOutcome};

pub struct IngestCoordinator {
    registrar: MetadataRegistrar,
    store: Arc<dyn FileStore>,
    config: IngestConfig,
    shutdown: CancellationToken,
}

impl IngestCoordinator {
    pub fn new(
        registrar: MetadataRegistrar,
        store: Arc<dyn FileStore>,
        config: IngestConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registrar,
            store,
            config,
            shutdown,
        }
    }

    /// Run one upload to its end and send the reply through `transport`.
    ///
    /// Returns the same result that was sent to the caller.
    pub async fn handle<T: UploadTransport>(&self, transport: &mut T) -> Result<Uuid, IngestError> {
        let result = self.ingest(transport).await;

        let reply = match &result {
            Ok(id) => Ok(UploadResponse { id: *id }),
            Err(e) => {
                log_error(e);
                Err(ErrorResponse::with_cause(e))
            }
        };

        if let Err(e) = transport.reply_and_close(reply).await {
            tracing::warn!(error = %e, "Failed to send upload reply");
        }

        result
    }

    /// Run the upload protocol without replying.
    #[tracing::instrument(skip_all, fields(upload.id = tracing::field::Empty))]
    pub async fn ingest<T: UploadTransport>(&self, transport: &mut T) -> Result<Uuid, IngestError> {
        let metadata = match transport.receive().await {
            Ok(Some(Frame::Metadata(metadata))) => metadata,
            Ok(Some(Frame::Data(_))) | Ok(None) => {
                return Err(IngestError::protocol(METADATA_REQUIRED_FIRST));
            }
            Err(e) => return Err(IngestError::protocol_with_source("receive failed", e)),
        };
        validate_upload_metadata(&metadata)?;

        let id = self.registrar.register(&metadata).await?;
        tracing::Span::current().record("upload.id", tracing::field::display(id));

        let mut writer =
            StreamWriter::new(id, self.store.clone(), self.config.clone()).spawn(&self.shutdown);
        tracing::debug!(file.name = %metadata.name, "Upload writer started");

        let mut chunks: u64 = 0;
        loop {
            if writer.is_finished() {
                return Err(writer_stopped(writer.outcome().await));
            }

            let frame = tokio::select! {
                biased;

                outcome = writer.outcome() => return Err(writer_stopped(outcome)),
                frame = transport.receive() => frame,
            };

            match frame {
                Ok(Some(Frame::Data(chunk))) => {
                    if writer.send_chunk(chunk).await.is_err() {
                        return Err(writer_stopped(writer.outcome().await));
                    }
                    chunks += 1;
                }
                Ok(Some(Frame::Metadata(_))) => {
                    writer.abort("unexpected metadata frame");
                    return Err(IngestError::protocol("unexpected metadata frame"));
                }
                Ok(None) => {
                    writer.finish();
                    return match writer.outcome().await {
                        WriterOutcome::Completed { bytes_written } => {
                            tracing::info!(chunks, size_bytes = bytes_written, "Upload completed");
                            Ok(id)
                        }
                        outcome => Err(writer_stopped(outcome)),
                    };
                }
                Err(e) => {
                    abort_writer(&mut writer, &e.to_string());
                    return Err(IngestError::protocol_with_source("receive failed", e));
                }
            }
        }
    }
}

/// Tell the writer the stream broke. It cleans up on its own.
fn abort_writer(writer: &mut WriterHandle, reason: &str) {
    tracing::warn!(reason, "Upload stream broke, aborting writer");
    writer.abort(reason);
}

/// The error reported when the writer stops before the caller ended the stream.
fn writer_stopped(outcome: WriterOutcome) -> IngestError {
    match outcome {
        WriterOutcome::Failed(e) => IngestError::Storage(format!("failed to store data: {}", e)),
        WriterOutcome::Aborted { reason, .. } => IngestError::Internal(format!(
            "writer stopped before the stream completed: {}",
            reason
        )),
        WriterOutcome::Completed { .. } => {
            IngestError::Internal("writer completed before the stream ended".to_string())
        }
    }
}

fn log_error(err: &IngestError) {
    use streamer_core::{ErrorMetadata, LogLevel};

    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            error = %err,
            error_type = err.error_type(),
            "Upload rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            error = %err.detailed_message(),
            error_type = err.error_type(),
            "Upload rejected"
        ),
        LogLevel::Error => tracing::error!(
            error = %err.detailed_message(),
            error_type = err.error_type(),
            "Upload failed"
        ),
    }
}
