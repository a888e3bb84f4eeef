//! Streamer ingestion services
//!
//! Streaming upload pipeline: a coordinator per upload sequences "metadata first, then
//! chunks", persists the file record through the [`MetadataRegistrar`], and hands chunks
//! to a [`StreamWriter`] task that owns the on-disk artifact.

pub mod coordinator;
pub mod registrar;
pub mod service;
pub mod transport;
pub mod writer;

pub use coordinator::IngestCoordinator;
pub use registrar::MetadataRegistrar;
pub use service::IngestService;
pub use transport::{channel, ChannelTransport, UploadClient, UploadReply, UploadTransport};
pub use writer::{AbortReason, StreamEnd, StreamWriter, WriterHandle, WriterOutcome, WriterState};
