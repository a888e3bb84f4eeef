//! Error types module
//!
//! `IngestError` is the failure an upload reports back to its caller. Each variant is one
//! error category and describes its own presentation through [`ErrorMetadata`].
//!
//! Writer aborts (timeout, cancellation, client abort) have no variant of their own. They
//! are logged where they happen and reach the caller only as `Internal`.

use serde::{Deserialize, Serialize};
use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client-side protocol violations
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PROTOCOL_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the caller may retry the upload)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Failures of the inbound frame stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("stream closed by peer")]
    Closed,

    #[error("transport failure: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    #[error("Persistence error: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IngestError {
    pub fn protocol(message: impl Into<String>) -> Self {
        IngestError::Protocol {
            message: message.into(),
            source: None,
        }
    }

    pub fn protocol_with_source(message: impl Into<String>, source: TransportError) -> Self {
        IngestError::Protocol {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            IngestError::Protocol { .. } => "Protocol",
            IngestError::Persistence(_) => "Persistence",
            IngestError::Storage(_) => "Storage",
            IngestError::Internal(_) => "Internal",
            IngestError::InvalidInput(_) => "InvalidInput",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn ingest_error_static_metadata(err: &IngestError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        IngestError::Protocol { .. } => (400, "PROTOCOL_ERROR", false, false, LogLevel::Warn),
        IngestError::Persistence(_) => (500, "PERSISTENCE_ERROR", true, true, LogLevel::Error),
        IngestError::Storage(_) => (500, "STORAGE_ERROR", true, true, LogLevel::Error),
        IngestError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        IngestError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
    }
}

impl ErrorMetadata for IngestError {
    fn http_status_code(&self) -> u16 {
        ingest_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        ingest_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        ingest_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        ingest_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        ingest_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            IngestError::Protocol { message, .. } => message.clone(),
            IngestError::Persistence(_) => "Failed to save file details".to_string(),
            IngestError::Storage(_) => "Failed to store file data".to_string(),
            IngestError::Internal(_) => "Internal server error".to_string(),
            IngestError::InvalidInput(ref msg) => msg.clone(),
        }
    }
}

/// Structured error returned to the caller of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error category
    pub code: String,
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Build the response for `err`. Details are only attached when `expose_details` is set
    /// and the error is not marked sensitive.
    pub fn from_error(err: &IngestError, expose_details: bool) -> Self {
        let details = if expose_details && !err.is_sensitive() {
            Some(err.detailed_message())
        } else {
            None
        };

        Self {
            error: err.client_message(),
            code: err.error_code().to_string(),
            recoverable: err.is_recoverable(),
            details,
        }
    }
}

impl ErrorResponse {
    /// Build the reply an upload sends back to its caller.
    ///
    /// The full cause chain is always attached; callers facing untrusted clients decide
    /// whether to forward it.
    pub fn with_cause(err: &IngestError) -> Self {
        Self {
            details: Some(err.detailed_message()),
            ..ErrorResponse::from(err)
        }
    }

    /// Drop the attached details.
    pub fn without_details(self) -> Self {
        Self {
            details: None,
            ..self
        }
    }
}

impl From<&IngestError> for ErrorResponse {
    fn from(err: &IngestError) -> Self {
        ErrorResponse::from_error(err, false)
    }
}
