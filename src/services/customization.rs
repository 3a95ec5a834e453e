//! Customized-package request service

use validator::Validate;

use crate::{
    error::AppResult,
    models::customization::{CreateCustomizedPackage, CustomizedPackage},
    repository::Repository,
};

#[derive(Clone)]
pub struct CustomizationService {
    repository: Repository,
}

impl CustomizationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn submit(&self, request: CreateCustomizedPackage) -> AppResult<CustomizedPackage> {
        let request = request.normalized();
        request.validate()?;

        let created = self.repository.customizations.create(&request).await?;
        tracing::info!(id = %created.id, package_id = %created.package_id, "Customization request stored");
        Ok(created)
    }

    pub async fn list(&self) -> AppResult<Vec<CustomizedPackage>> {
        self.repository.customizations.list().await
    }
}
