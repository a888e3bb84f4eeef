use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// File details supplied by the caller as the first frame of an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UploadMetadata {
    /// Display name of the uploaded file
    #[validate(length(min = 3, message = "File name must be at least 3 characters"))]
    pub name: String,
    /// Content type (MIME type)
    #[validate(length(min = 1, message = "Content type must not be empty"))]
    pub content_type: String,
}

impl UploadMetadata {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
        }
    }
}

/// Persisted record describing one upload.
///
/// Written once, before any chunk of the upload is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(id: Uuid, metadata: &UploadMetadata, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: metadata.name.clone(),
            content_type: metadata.content_type.clone(),
            uploaded_at,
        }
    }
}

/// Reply sent to the caller once an upload has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: Uuid,
}
