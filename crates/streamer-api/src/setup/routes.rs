//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub const API_PREFIX: &str = "/api/v1";

const HTTP_CONCURRENCY_LIMIT: usize = 1_024;

pub fn setup_routes(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.limits.max_upload_bytes;

    let api = Router::new()
        .route("/files", post(handlers::upload::upload_file))
        .route("/files/{id}", get(handlers::files::get_file));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest(API_PREFIX, api)
        // The multipart body is streamed, so axum's buffered default limit does not apply.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
