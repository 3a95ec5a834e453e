//! Image upload/delete types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One file received from a multipart upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An image stored by the media service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    /// Public delivery URL
    pub url: String,
    pub public_id: String,
}

/// Delete by delivery URL or media public id
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    pub url: Option<String>,
    pub public_id: Option<String>,
}

/// Outcome of a best-effort bulk delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: usize,
    pub failed: usize,
}
