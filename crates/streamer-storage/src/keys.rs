//! Artifact path derivation.
//!
//! Layout: `{upload_root}/{id}/{id}`.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Directory holding the artifact of upload `id`.
pub fn upload_dir(upload_root: &Path, id: Uuid) -> PathBuf {
    upload_root.join(id.to_string())
}

/// Path of the artifact of upload `id`.
pub fn upload_path(upload_root: &Path, id: Uuid) -> PathBuf {
    upload_dir(upload_root, id).join(id.to_string())
}
