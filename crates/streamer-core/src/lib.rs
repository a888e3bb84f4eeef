//! Streamer Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by every Streamer component: the ingestion services, the storage layer,
//! the repository layer and the HTTP gateway.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, IngestConfig};
pub use error::{ErrorMetadata, ErrorResponse, IngestError, LogLevel, TransportError};
pub use models::{FileRecord, Frame, UploadMetadata, UploadResponse};
