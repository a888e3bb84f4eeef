//! Domain models

pub mod file;
pub mod frame;

pub use file::{FileRecord, UploadMetadata, UploadResponse};
pub use frame::Frame;
