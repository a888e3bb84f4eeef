//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpError>`. Errors raised inside the gateway
//! are `IngestError`s; errors produced by the upload pipeline arrive already rendered as an
//! [`ErrorResponse`] through the upload reply, cause chain included. That chain is only
//! forwarded outside production.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use streamer_core::{ErrorMetadata, ErrorResponse, IngestError, LogLevel};

#[derive(Debug)]
pub enum HttpError {
    /// Raised by the gateway itself
    Ingest(IngestError),
    /// Reply of a failed upload
    Upload(ErrorResponse),
    NotFound(String),
}

impl From<IngestError> for HttpError {
    fn from(err: IngestError) -> Self {
        HttpError::Ingest(err)
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(err: anyhow::Error) -> Self {
        HttpError::Ingest(IngestError::Internal(format!("{:#}", err)))
    }
}

/// Status for a pipeline error code. Unknown codes are server errors.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "PROTOCOL_ERROR" | "INVALID_INPUT" => StatusCode::BAD_REQUEST,
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_error(error: &IngestError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::Ingest(err) => {
                log_error(&err);
                let status = StatusCode::from_u16(err.http_status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, ErrorResponse::from_error(&err, !is_production_env()))
            }
            HttpError::Upload(response) => {
                tracing::debug!(
                    code = %response.code,
                    error = %response.error,
                    details = response.details.as_deref().unwrap_or_default(),
                    "Upload failed"
                );
                let status = status_for_code(&response.code);
                if is_production_env() {
                    (status, response.without_details())
                } else {
                    (status, response)
                }
            }
            HttpError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: message,
                    code: "NOT_FOUND".to_string(),
                    recoverable: false,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_code() {
        assert_eq!(status_for_code("PROTOCOL_ERROR"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_code("PERSISTENCE_ERROR"), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for_code("STORAGE_ERROR"), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let response =
            HttpError::from(IngestError::InvalidInput("File name not provided".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
