//! Gateway integration tests.
//!
//! Run with: `cargo test -p streamer-api --test files_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use chrono::Utc;
use helpers::{api_path, setup_test_app, setup_test_app_with};
use serde_json::Value;
use streamer_core::{ErrorResponse, FileRecord, UploadMetadata};
use streamer_db::{FileRecordRepository, InMemoryFileRecordRepository};
use uuid::Uuid;

fn file_part(content: &'static [u8], file_name: &str, mime: Option<&str>) -> Part {
    let part = Part::bytes(content).file_name(file_name.to_string());
    match mime {
        Some(mime) => part.mime_type(mime.to_string()),
        None => part,
    }
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_upload_file() {
    let app = setup_test_app();
    let content: &'static [u8] = b"hello streaming world";

    let form = MultipartForm::new()
        .add_text("name", "greeting.txt")
        .add_part("file", file_part(content, "greeting.txt", Some("text/plain")));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "File upload completed");
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let stored = tokio::fs::read(app.artifact_path(id)).await.unwrap();
    assert_eq!(stored, content);

    let records = app.repository.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "greeting.txt");
    assert_eq!(records[0].content_type, "text/plain");
}

#[tokio::test]
async fn test_upload_guesses_content_type_from_extension() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_text("name", "scan.pdf")
        .add_part("file", Part::bytes(&b"%PDF-1.4"[..]));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.repository.records()[0].content_type, "application/pdf");
}

#[tokio::test]
async fn test_upload_empty_file() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_text("name", "empty.bin")
        .add_part("file", file_part(b"", "empty.bin", Some("application/octet-stream")));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let id: Uuid = response.json::<Value>()["id"].as_str().unwrap().parse().unwrap();
    let metadata = tokio::fs::metadata(app.artifact_path(id)).await.unwrap();
    assert_eq!(metadata.len(), 0);
}

#[tokio::test]
async fn test_upload_without_name_is_rejected() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_part("file", file_part(b"data", "data.txt", None));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let error = response.json::<ErrorResponse>();
    assert_eq!(error.code, "INVALID_INPUT");
    assert_eq!(error.error, "File name not provided");
    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_text("name", "orphan.txt");
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<ErrorResponse>().error, "No file provided");
}

#[tokio::test]
async fn test_upload_with_short_name_is_protocol_error() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_text("name", "ab")
        .add_part("file", file_part(b"data", "ab", Some("text/plain")));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let error = response.json::<ErrorResponse>();
    assert_eq!(error.code, "PROTOCOL_ERROR");
    assert!(app.repository.is_empty());
}

#[tokio::test]
async fn test_upload_when_database_fails() {
    let app = setup_test_app_with(InMemoryFileRecordRepository::failing("connection refused"));

    let form = MultipartForm::new()
        .add_text("name", "notes.txt")
        .add_part("file", file_part(b"some notes", "notes.txt", Some("text/plain")));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 500);
    let error = response.json::<ErrorResponse>();
    assert_eq!(error.code, "PERSISTENCE_ERROR");
    assert_eq!(error.error, "Failed to save file details");
    assert!(error.details.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_upload_after_shutdown_fails() {
    let app = setup_test_app();
    app.shutdown.cancel();

    let form = MultipartForm::new()
        .add_text("name", "late.txt")
        .add_part("file", file_part(b"too late", "late.txt", Some("text/plain")));
    let response = app.client().post(&api_path("/files")).multipart(form).await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<ErrorResponse>().code, "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_get_file() {
    let repository = InMemoryFileRecordRepository::new();
    let record = FileRecord::new(
        Uuid::new_v4(),
        &UploadMetadata::new("photo.png", "image/png"),
        Utc::now(),
    );
    repository.save(&record).await.unwrap();
    let app = setup_test_app_with(repository);

    let response = app
        .client()
        .get(&api_path(&format!("/files/{}", record.id)))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<FileRecord>(), record);
}

#[tokio::test]
async fn test_get_missing_file() {
    let app = setup_test_app();

    let response = app
        .client()
        .get(&api_path(&format!("/files/{}", Uuid::new_v4())))
        .await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<ErrorResponse>().code, "NOT_FOUND");
}
