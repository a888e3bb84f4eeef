use bytes::Bytes;

use super::UploadMetadata;

/// One message of the inbound upload stream.
///
/// A well-formed stream is exactly one `Metadata` frame followed by any number of
/// `Data` frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Metadata(UploadMetadata),
    Data(Bytes),
}

impl Frame {
    pub fn metadata(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Frame::Metadata(UploadMetadata::new(name, content_type))
    }

    pub fn data(payload: impl Into<Bytes>) -> Self {
        Frame::Data(payload.into())
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, Frame::Metadata(_))
    }
}
