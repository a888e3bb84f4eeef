//! Stream writer
//!
//! One writer task owns the on-disk artifact of one upload. It consumes chunks from a
//! bounded data channel until the coordinator signals the end of the stream, and
//! aborts on its own when the upload goes idle or the service shuts down.
//!
//! Signalling is split by owner:
//! - the coordinator owns the data channel and a one-shot [`StreamEnd`] signal,
//! - the service owns the parent [`CancellationToken`],
//! - the writer owns its result, returned through the task's `JoinHandle`.
//!
//! None of these can block the writer's exit.

use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use streamer_core::IngestConfig;
use streamer_storage::{upload_dir, upload_path, FileHandle, FileStore, StorageError};
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// One slot; [`WriterHandle::send_chunk`] waits until the writer has taken the chunk out of
/// it, so the coordinator never holds more than one chunk the writer has not started on.
const DATA_CHANNEL_CAPACITY: usize = 1;

/// End-of-stream signal sent by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// No more chunks will arrive; the stream completed normally
    Completed,
    /// The stream broke; stop writing
    Aborted(String),
}

/// Lifecycle of a writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    CreatingDirectory,
    CreatingFile,
    Writing,
    Completed,
    Aborted,
    Failed,
}

/// Why a writer stopped without completing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// No chunk and no end signal within the inactivity window
    Timeout,
    /// The parent cancellation token fired
    Cancelled,
    /// The coordinator reported a broken stream, or went away without an end signal
    Client(String),
    /// The writer task panicked
    Panicked,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Timeout => write!(f, "inactivity timeout"),
            AbortReason::Cancelled => write!(f, "cancelled"),
            AbortReason::Client(reason) => write!(f, "client abort: {}", reason),
            AbortReason::Panicked => write!(f, "writer task panicked"),
        }
    }
}

/// Final result of a writer task
#[derive(Debug)]
pub enum WriterOutcome {
    Completed { bytes_written: u64 },
    Aborted { reason: AbortReason, bytes_written: u64 },
    Failed(StorageError),
}

impl WriterOutcome {
    pub fn state(&self) -> WriterState {
        match self {
            WriterOutcome::Completed { .. } => WriterState::Completed,
            WriterOutcome::Aborted { .. } => WriterState::Aborted,
            WriterOutcome::Failed(_) => WriterState::Failed,
        }
    }
}

/// Writes the chunks of one upload to storage
pub struct StreamWriter {
    id: Uuid,
    store: Arc<dyn FileStore>,
    config: IngestConfig,
}

impl StreamWriter {
    pub fn new(id: Uuid, store: Arc<dyn FileStore>, config: IngestConfig) -> Self {
        Self { id, store, config }
    }

    /// Start the writer on its own task.
    ///
    /// The writer observes a child of `parent`, so cancelling `parent` stops it.
    pub fn spawn(self, parent: &CancellationToken) -> WriterHandle {
        let (data_tx, data_rx) = mpsc::channel(DATA_CHANNEL_CAPACITY);
        let (end_tx, end_rx) = oneshot::channel();
        let cancel = parent.child_token();
        let id = self.id;

        let span = tracing::info_span!("stream_writer", upload.id = %id);
        let task = tokio::spawn(self.run(data_rx, end_rx, cancel).instrument(span));

        WriterHandle {
            id,
            data_tx: Some(data_tx),
            end_tx: Some(end_tx),
            task,
        }
    }

    /// Run the writer to completion on the current task.
    pub async fn run(
        self,
        data_rx: mpsc::Receiver<Bytes>,
        end_rx: oneshot::Receiver<StreamEnd>,
        cancel: CancellationToken,
    ) -> WriterOutcome {
        let dir = upload_dir(&self.config.upload_root, self.id);
        tracing::debug!(state = ?WriterState::CreatingDirectory, path = %dir.display());
        if let Err(e) = self.store.mkdir_all(&dir).await {
            tracing::error!(error = %e, "Failed to create directory for upload file");
            return WriterOutcome::Failed(e);
        }

        let path = upload_path(&self.config.upload_root, self.id);
        tracing::debug!(state = ?WriterState::CreatingFile, path = %path.display());
        let mut file = match self.store.create(&path).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create upload file");
                return WriterOutcome::Failed(e);
            }
        };

        tracing::debug!(state = ?WriterState::Writing, path = %path.display());
        let outcome = self
            .write_loop(file.as_mut(), data_rx, end_rx, cancel)
            .await;

        // The handle is released on every path out of the loop.
        let outcome = match (file.close().await, outcome) {
            (Ok(()), outcome) => outcome,
            (Err(e), WriterOutcome::Completed { .. }) => {
                tracing::error!(error = %e, "Failed to close upload file");
                WriterOutcome::Failed(e)
            }
            (Err(e), outcome) => {
                tracing::warn!(error = %e, "Failed to close upload file after writer stopped");
                outcome
            }
        };

        self.log_outcome(&path, &outcome);
        outcome
    }

    async fn write_loop(
        &self,
        file: &mut dyn FileHandle,
        mut data_rx: mpsc::Receiver<Bytes>,
        mut end_rx: oneshot::Receiver<StreamEnd>,
        cancel: CancellationToken,
    ) -> WriterOutcome {
        let mut bytes_written: u64 = 0;
        let mut data_open = true;

        loop {
            // Cancellation wins over pending work; chunks win over the end signal so
            // that nothing sent before it is lost.
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    return WriterOutcome::Aborted { reason: AbortReason::Cancelled, bytes_written };
                }

                chunk = data_rx.recv(), if data_open => match chunk {
                    Some(chunk) => {
                        if let Err(e) = file.write(&chunk).await {
                            return WriterOutcome::Failed(e);
                        }
                        bytes_written += chunk.len() as u64;
                    }
                    None => data_open = false,
                },

                end = &mut end_rx => {
                    return match end {
                        Ok(StreamEnd::Completed) => {
                            while let Ok(chunk) = data_rx.try_recv() {
                                if let Err(e) = file.write(&chunk).await {
                                    return WriterOutcome::Failed(e);
                                }
                                bytes_written += chunk.len() as u64;
                            }
                            WriterOutcome::Completed { bytes_written }
                        }
                        Ok(StreamEnd::Aborted(reason)) => WriterOutcome::Aborted {
                            reason: AbortReason::Client(reason),
                            bytes_written,
                        },
                        Err(_) => WriterOutcome::Aborted {
                            reason: AbortReason::Client("stream closed without end signal".to_string()),
                            bytes_written,
                        },
                    };
                }

                _ = tokio::time::sleep(self.config.inactivity_timeout) => {
                    return WriterOutcome::Aborted { reason: AbortReason::Timeout, bytes_written };
                }
            }
        }
    }

    fn log_outcome(&self, path: &std::path::Path, outcome: &WriterOutcome) {
        match outcome {
            WriterOutcome::Completed { bytes_written } => {
                tracing::info!(
                    path = %path.display(),
                    size_bytes = bytes_written,
                    "Upload file written"
                );
            }
            WriterOutcome::Aborted {
                reason,
                bytes_written,
            } => {
                // Partial artifacts stay on disk for reconciliation.
                tracing::warn!(
                    path = %path.display(),
                    size_bytes = bytes_written,
                    reason = %reason,
                    "Upload writer aborted"
                );
            }
            WriterOutcome::Failed(e) => {
                tracing::error!(path = %path.display(), error = %e, "Upload writer failed");
            }
        }
    }

    pub fn artifact_path(&self) -> PathBuf {
        upload_path(&self.config.upload_root, self.id)
    }
}

/// Coordinator-side handle to a running writer
pub struct WriterHandle {
    id: Uuid,
    data_tx: Option<mpsc::Sender<Bytes>>,
    end_tx: Option<oneshot::Sender<StreamEnd>>,
    task: JoinHandle<WriterOutcome>,
}

impl WriterHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Hand a chunk to the writer and wait until the writer has received it.
    ///
    /// While the writer is busy with the previous chunk this does not return. Fails once the
    /// writer has stopped or the stream was already ended.
    pub async fn send_chunk(&self, chunk: Bytes) -> Result<(), SendError<()>> {
        let tx = self.data_tx.as_ref().ok_or(SendError(()))?;
        tx.send(chunk).await.map_err(|_| SendError(()))?;

        // The slot frees up only when the writer takes the chunk.
        tx.reserve().await.map(drop).map_err(|_| SendError(()))
    }

    /// Signal normal end of stream. Chunks already sent are still written.
    pub fn finish(&mut self) {
        self.data_tx.take();
        self.signal(StreamEnd::Completed);
    }

    /// Signal a broken stream.
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.data_tx.take();
        self.signal(StreamEnd::Aborted(reason.into()));
    }

    fn signal(&mut self, end: StreamEnd) {
        if let Some(end_tx) = self.end_tx.take() {
            // The writer may already be gone; its outcome says why.
            let _ = end_tx.send(end);
        }
    }

    /// Whether the writer task has already stopped
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the writer to stop.
    ///
    /// Must not be polled again once it has returned.
    pub async fn outcome(&mut self) -> WriterOutcome {
        match (&mut self.task).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => WriterOutcome::Aborted {
                reason: AbortReason::Cancelled,
                bytes_written: 0,
            },
            Err(e) => {
                tracing::error!(upload.id = %self.id, error = %e, "Upload writer task failed");
                WriterOutcome::Aborted {
                    reason: AbortReason::Panicked,
                    bytes_written: 0,
                }
            }
        }
    }
}
