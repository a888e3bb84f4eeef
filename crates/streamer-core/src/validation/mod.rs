//! Validation of inbound upload metadata

use validator::Validate;

use crate::error::IngestError;
use crate::models::UploadMetadata;

/// Message used when a stream does not open with usable metadata.
pub const METADATA_REQUIRED_FIRST: &str = "metadata required first";

/// Check the metadata frame that opens an upload.
///
/// Missing fields are reported as [`METADATA_REQUIRED_FIRST`]; present but invalid
/// fields (e.g. a name shorter than three characters) as `invalid metadata`.
pub fn validate_upload_metadata(metadata: &UploadMetadata) -> Result<(), IngestError> {
    if metadata.name.trim().is_empty() || metadata.content_type.trim().is_empty() {
        return Err(IngestError::protocol(METADATA_REQUIRED_FIRST));
    }

    metadata
        .validate()
        .map_err(|e| IngestError::protocol(format!("invalid metadata: {}", e)))
}
