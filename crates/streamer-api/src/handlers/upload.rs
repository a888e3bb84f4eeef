//! Multipart upload endpoint
//!
//! Accepts a `name` text field followed by a `file` part and streams the part's bytes into
//! the ingestion pipeline as fixed-size data frames.

use crate::error::HttpError;
use crate::state::AppState;
use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use bytes::BytesMut;
use serde::Serialize;
use std::sync::Arc;
use streamer_core::{IngestError, UploadMetadata};
use streamer_services::{UploadClient, UploadReply};
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
pub struct UploadCompleted {
    pub message: &'static str,
    pub id: Uuid,
}

pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadCompleted>, HttpError> {
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        match field_name.as_str() {
            "name" => {
                let value = field.text().await.map_err(|e| {
                    IngestError::InvalidInput(format!("Failed to read file name: {}", e))
                })?;
                name = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            }
            "file" => {
                // The name has to arrive before the file so metadata can lead the stream.
                let name = name
                    .take()
                    .ok_or_else(|| IngestError::InvalidInput("File name not provided".to_string()))?;
                let content_type =
                    resolve_content_type(field.content_type(), field.file_name(), &name);

                let id = stream_field(&state, field, UploadMetadata::new(name, content_type)).await?;
                return Ok(Json(UploadCompleted {
                    message: "File upload completed",
                    id,
                }));
            }
            _ => {}
        }
    }

    match name {
        None => Err(IngestError::InvalidInput("File name not provided".to_string()).into()),
        Some(_) => Err(IngestError::InvalidInput("No file provided".to_string()).into()),
    }
}

/// Send `field` through a new upload and wait for the pipeline's reply.
#[tracing::instrument(skip(state, field, metadata), fields(file.name = %metadata.name, content_type = %metadata.content_type))]
async fn stream_field(
    state: &AppState,
    mut field: Field<'_>,
    metadata: UploadMetadata,
) -> Result<Uuid, HttpError> {
    let chunk_size = state.limits.chunk_size_bytes;
    let client = state.ingest.open_upload();

    if client.send_metadata(metadata).await.is_err() {
        return finish(client).await;
    }

    let mut buffer = BytesMut::with_capacity(chunk_size);
    let mut total: usize = 0;
    loop {
        let bytes = match field.chunk().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => break,
            Err(e) => {
                let reason = format!("Failed to read file data: {}", e);
                // The reply only confirms the abort.
                let _ = client.abort(reason.clone()).await;
                return Err(IngestError::InvalidInput(reason).into());
            }
        };

        total += bytes.len();
        buffer.extend_from_slice(&bytes);
        while buffer.len() >= chunk_size {
            let chunk = buffer.split_to(chunk_size).freeze();
            if client.send_chunk(chunk).await.is_err() {
                // The pipeline stopped reading; its reply says why.
                return finish(client).await;
            }
        }
    }

    if !buffer.is_empty() && client.send_chunk(buffer.freeze()).await.is_err() {
        return finish(client).await;
    }

    tracing::debug!(size_bytes = total, "File streamed to pipeline");
    finish(client).await
}

async fn finish(client: UploadClient) -> Result<Uuid, HttpError> {
    let reply: UploadReply = client.close_and_recv().await.map_err(|e| {
        IngestError::Internal(format!("upload ended without a reply: {}", e))
    })?;

    reply.map(|response| response.id).map_err(HttpError::Upload)
}

/// Content type of the part, else guessed from the part's file name, then from `name`.
///
/// A generic `application/octet-stream` header counts as no header.
fn resolve_content_type(header: Option<&str>, file_name: Option<&str>, name: &str) -> String {
    let declared = header
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case(DEFAULT_CONTENT_TYPE));
    if let Some(content_type) = declared {
        return content_type.to_string();
    }

    file_name
        .and_then(content_type_from_extension)
        .or_else(|| content_type_from_extension(name))
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

fn content_type_from_extension(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let content_type = match extension.to_lowercase().as_str() {
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(content_type)
}
