use crate::error::HttpError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use streamer_core::FileRecord;
use uuid::Uuid;

/// Look up the record of an upload.
#[tracing::instrument(skip(state))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileRecord>, HttpError> {
    let record = state.file_repository.find_by_id(id).await?;

    match record {
        Some(record) => Ok(Json(record)),
        None => Err(HttpError::NotFound(format!("File {} not found", id))),
    }
}
