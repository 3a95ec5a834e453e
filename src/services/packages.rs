//! Package catalog service

use serde::Serialize;
use snowflaked::sync::Generator;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::package::{Package, PackageInput, RegisterRequest, Registration},
    repository::Repository,
};

use super::media::MediaService;

static PACKAGE_IDS: Generator = Generator::new(0);

/// Result of deleting a package and its images
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPackage {
    pub id: String,
    pub images_deleted: usize,
    pub images_failed: usize,
}

#[derive(Clone)]
pub struct PackagesService {
    repository: Repository,
    media: MediaService,
}

impl PackagesService {
    pub fn new(repository: Repository, media: MediaService) -> Self {
        Self { repository, media }
    }

    pub async fn list(&self) -> AppResult<Vec<Package>> {
        self.repository.packages.list().await
    }

    pub async fn get(&self, id: &str) -> AppResult<Package> {
        self.repository.packages.get_by_id(id).await
    }

    pub async fn search(&self, text: Option<&str>) -> AppResult<Vec<Package>> {
        let text = text.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(AppError::BadRequest("Search query is required".to_string()));
        }
        self.repository.packages.search(text).await
    }

    pub async fn create(&self, input: PackageInput) -> AppResult<Package> {
        let input = input.normalized();
        input.validate()?;

        let id = PACKAGE_IDS.generate::<u64>().to_string();
        let package = self.repository.packages.create(&id, &input).await?;
        tracing::info!(id = %package.id, title = %package.title, "Package created");
        Ok(package)
    }

    pub async fn update(&self, id: &str, input: PackageInput) -> AppResult<Package> {
        let input = input.normalized();
        input.validate()?;

        let package = self.repository.packages.update(id, &input).await?;
        tracing::info!(%id, "Package updated");
        Ok(package)
    }

    /// Delete the package first, then its images. Image failures never undo the delete.
    pub async fn delete(&self, id: &str) -> AppResult<DeletedPackage> {
        let images = self.repository.packages.delete(id).await?;
        let report = self.media.purge(&images).await;

        tracing::info!(
            %id,
            images_deleted = report.deleted,
            images_failed = report.failed,
            "Package deleted"
        );
        Ok(DeletedPackage {
            id: id.to_string(),
            images_deleted: report.deleted,
            images_failed: report.failed,
        })
    }

    /// Register interest; one registration per (package, email)
    pub async fn register(&self, id: &str, request: RegisterRequest) -> AppResult<Registration> {
        let request = request.normalized();
        request.validate()?;

        if !self.repository.packages.exists(id).await? {
            return Err(AppError::NotFound(format!("Package {} not found", id)));
        }

        self.repository
            .packages
            .add_registration(id, &request)
            .await?
            .ok_or_else(|| AppError::Conflict("Email already registered for this package".to_string()))
    }

    pub async fn registrations(&self, id: &str) -> AppResult<Vec<Registration>> {
        if !self.repository.packages.exists(id).await? {
            return Err(AppError::NotFound(format!("Package {} not found", id)));
        }
        self.repository.packages.registrations(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| PACKAGE_IDS.generate::<u64>().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn deleted_package_serializes_in_camel_case() {
        let body = serde_json::to_value(DeletedPackage {
            id: "42".into(),
            images_deleted: 2,
            images_failed: 1,
        })
        .unwrap();
        assert_eq!(body["imagesDeleted"], 2);
        assert_eq!(body["imagesFailed"], 1);
    }
}
