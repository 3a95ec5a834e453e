//! Image upload endpoints

use axum::{extract::State, http::StatusCode};
use axum_extra::extract::{multipart::MultipartRejection, Multipart};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::media::{DeleteImageRequest, ImageUpload, StoredImage},
    AppState,
};

use super::{AdminSession, ApiJson, Envelope};

/// Upper bound on `file` parts accepted in one request
pub const MAX_FILES_PER_REQUEST: usize = 10;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedImage {
    pub public_id: String,
}

/// Multipart body of an upload; `file` may repeat
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Upload one or more images (multipart `file` parts)
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    security(("cookie_auth" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "One or more `file` parts"),
    responses(
        (status = 201, description = "Images stored", body = Vec<StoredImage>),
        (status = 400, description = "No file, not an image, or too large"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn upload_images(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Envelope<Vec<StoredImage>>)> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if files.len() == MAX_FILES_PER_REQUEST {
            return Err(AppError::Validation(format!(
                "At most {} files per upload",
                MAX_FILES_PER_REQUEST
            )));
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        files.push(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let stored = state.services.media.upload(files).await?;
    Ok((StatusCode::CREATED, Envelope::success(stored)))
}

/// Delete an image by delivery URL or public id
#[utoipa::path(
    post,
    path = "/upload/delete",
    tag = "upload",
    security(("cookie_auth" = [])),
    request_body = DeleteImageRequest,
    responses(
        (status = 200, description = "Image deleted", body = DeletedImage),
        (status = 400, description = "Neither url nor publicId given"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    AdminSession(_admin): AdminSession,
    ApiJson(request): ApiJson<DeleteImageRequest>,
) -> AppResult<Envelope<DeletedImage>> {
    let public_id = state.services.media.delete(request).await?;
    Ok(Envelope::success(DeletedImage { public_id }))
}
