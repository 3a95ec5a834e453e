//! Media service client (Cloudinary-compatible signed upload API)

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Url,
};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tokio::task::JoinSet;

use crate::{
    config::MediaConfig,
    error::{AppError, AppResult},
    models::media::{DeleteImageRequest, ImageUpload, PurgeReport, StoredImage},
};

/// External image storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> AppResult<StoredImage>;
    async fn delete(&self, public_id: &str) -> AppResult<()>;
}

/// Signature over the sorted request parameters followed by the API secret
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive the media public id from a delivery URL such as
/// `https://res.cloudinary.com/<cloud>/image/upload/v1712/packages/goa.jpg`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let upload_at = segments.iter().position(|s| *s == "upload")?;
    let mut rest = &segments[upload_at + 1..];

    // Skip transformations up to and including the version segment
    if let Some(version_at) = rest.iter().position(|s| is_version_segment(s)) {
        rest = &rest[version_at + 1..];
    }
    if rest.is_empty() {
        return None;
    }

    let mut path = rest.join("/");
    if let Some(dot) = path.rfind('.') {
        if dot > path.rfind('/').map_or(0, |slash| slash + 1) {
            path.truncate(dot);
        }
    }
    (!path.is_empty()).then_some(path)
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

pub struct CloudinaryStore {
    client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    pub fn new(config: MediaConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build media HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, image: ImageUpload) -> AppResult<StoredImage> {
        let mut params: Vec<(&'static str, String)> =
            vec![("timestamp", Utc::now().timestamp().to_string())];
        if let Some(folder) = self.config.folder.as_ref().filter(|f| !f.is_empty()) {
            params.push(("folder", folder.clone()));
        }
        let signature = sign_params(&params, &self.config.api_secret);

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| AppError::Validation(format!("Invalid content type: {}", e)))?;

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Image upload failed with {}: {}", status, text)));
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(StoredImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> AppResult<()> {
        let params: Vec<(&'static str, String)> = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form: Vec<(&str, String)> = params;
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Image delete failed with {}: {}", status, text)));
        }

        let destroyed: DestroyResponse = response.json().await?;
        match destroyed.result.as_str() {
            "ok" => {
                tracing::info!(%public_id, "Image deleted");
                Ok(())
            }
            "not found" => {
                tracing::warn!(%public_id, "Image already absent from media service");
                Ok(())
            }
            other => Err(AppError::Upstream(format!(
                "Image delete for {} returned '{}'",
                public_id, other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn MediaStore>,
    max_upload_bytes: usize,
}

impl MediaService {
    pub fn new(store: Arc<dyn MediaStore>, max_upload_bytes: usize) -> Self {
        Self { store, max_upload_bytes }
    }

    /// Check and upload every file, in order
    pub async fn upload(&self, files: Vec<ImageUpload>) -> AppResult<Vec<StoredImage>> {
        if files.is_empty() {
            return Err(AppError::Validation("No file provided".to_string()));
        }
        for file in &files {
            self.check_upload(file)?;
        }

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            stored.push(self.store.upload(file).await?);
        }
        Ok(stored)
    }

    fn check_upload(&self, file: &ImageUpload) -> AppResult<()> {
        if !file.content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "{} is not an image ({})",
                file.file_name, file.content_type
            )));
        }
        if file.bytes.is_empty() {
            return Err(AppError::Validation(format!("{} is empty", file.file_name)));
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "{} exceeds the {} byte upload limit",
                file.file_name, self.max_upload_bytes
            )));
        }
        Ok(())
    }

    /// Delete one image by public id or delivery URL; returns the public id
    pub async fn delete(&self, request: DeleteImageRequest) -> AppResult<String> {
        let public_id = match (request.public_id, request.url) {
            (Some(id), _) if !id.trim().is_empty() => id.trim().to_string(),
            (_, Some(url)) if !url.trim().is_empty() => public_id_from_url(url.trim())
                .ok_or_else(|| AppError::Validation(format!("Unrecognised image URL: {}", url)))?,
            _ => {
                return Err(AppError::Validation(
                    "Either url or publicId is required".to_string(),
                ))
            }
        };

        self.store.delete(&public_id).await?;
        Ok(public_id)
    }

    /// Delete every image concurrently. Failures are logged and counted, never returned.
    pub async fn purge(&self, urls: &[String]) -> PurgeReport {
        let mut tasks = JoinSet::new();
        for url in urls {
            let store = Arc::clone(&self.store);
            let url = url.clone();
            tasks.spawn(async move {
                let result = match public_id_from_url(&url) {
                    Some(public_id) => store.delete(&public_id).await,
                    None => Err(AppError::Validation(format!("Unrecognised image URL: {}", url))),
                };
                (url, result)
            });
        }

        let mut report = PurgeReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => report.deleted += 1,
                Ok((url, Err(e))) => {
                    tracing::warn!(%url, error = %e, "Failed to delete image");
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Image deletion task aborted");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn image(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "goa.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![7u8; size],
        }
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let params = vec![
            ("timestamp", "1700000000".to_string()),
            ("folder", "packages".to_string()),
        ];
        assert_eq!(
            sign_params(&params, "abcd"),
            "a175868523cdd8733f71f0d1a1b510a264e84d06"
        );

        let params = vec![
            ("public_id", "packages/goa-beach".to_string()),
            ("timestamp", "1700000000".to_string()),
        ];
        assert_eq!(
            sign_params(&params, "abcd"),
            "0eebef1f7495c438f2f820980b5cdc846c0756f4"
        );
    }

    #[test]
    fn public_id_is_derived_from_delivery_urls() {
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/v1712345678/packages/goa-beach.jpg"),
            Some("packages/goa-beach".to_string())
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/w_300,c_fill/v17/hero.webp"),
            Some("hero".to_string())
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/packages/kerala"),
            Some("packages/kerala".to_string())
        );
        assert_eq!(public_id_from_url("https://example.com/goa.jpg"), None);
        assert_eq!(public_id_from_url("not a url"), None);
    }

    #[tokio::test]
    async fn upload_rejects_non_images_and_oversized_files() {
        let service = MediaService::new(Arc::new(MockMediaStore::new()), 1024);

        let err = service.upload(vec![image("application/pdf", 10)]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.upload(vec![image("image/png", 2048)]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.upload(vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_forwards_valid_images() {
        let mut store = MockMediaStore::new();
        store.expect_upload().times(2).returning(|img| {
            Ok(StoredImage {
                url: format!("https://res.cloudinary.com/demo/image/upload/v1/packages/{}", img.file_name),
                public_id: format!("packages/{}", img.file_name),
            })
        });
        let service = MediaService::new(Arc::new(store), 1024);

        let stored = tokio_test::assert_ok!(
            service
                .upload(vec![image("image/jpeg", 10), image("image/webp", 20)])
                .await
        );
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn delete_prefers_public_id_then_url() {
        let mut store = MockMediaStore::new();
        store
            .expect_delete()
            .with(eq("packages/goa"))
            .times(2)
            .returning(|_| Ok(()));
        let service = MediaService::new(Arc::new(store), 1024);

        let id = service
            .delete(DeleteImageRequest { url: None, public_id: Some("packages/goa".into()) })
            .await
            .unwrap();
        assert_eq!(id, "packages/goa");

        let id = service
            .delete(DeleteImageRequest {
                url: Some("https://res.cloudinary.com/demo/image/upload/v9/packages/goa.png".into()),
                public_id: None,
            })
            .await
            .unwrap();
        assert_eq!(id, "packages/goa");

        let err = service
            .delete(DeleteImageRequest { url: None, public_id: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn purge_attempts_every_image_even_after_a_failure() {
        let mut store = MockMediaStore::new();
        store
            .expect_delete()
            .with(eq("packages/first"))
            .times(1)
            .returning(|_| Err(AppError::Upstream("503 Service Unavailable".into())));
        store
            .expect_delete()
            .with(eq("packages/second"))
            .times(1)
            .returning(|_| Ok(()));
        let service = MediaService::new(Arc::new(store), 1024);

        let report = service
            .purge(&[
                "https://res.cloudinary.com/demo/image/upload/v1/packages/first.jpg".to_string(),
                "https://res.cloudinary.com/demo/image/upload/v1/packages/second.jpg".to_string(),
            ])
            .await;

        assert_eq!(report, PurgeReport { deleted: 1, failed: 1 });
    }

    #[tokio::test]
    async fn purge_counts_unrecognised_urls_as_failures() {
        let service = MediaService::new(Arc::new(MockMediaStore::new()), 1024);
        let report = service.purge(&["https://example.com/x.jpg".to_string()]).await;
        assert_eq!(report, PurgeReport { deleted: 0, failed: 1 });
    }
}
