//! Business logic services

pub mod auth;
pub mod chat;
pub mod contacts;
pub mod customization;
pub mod media;
pub mod newsletter;
pub mod packages;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub packages: packages::PackagesService,
    pub contacts: contacts::ContactsService,
    pub newsletter: newsletter::NewsletterService,
    pub customizations: customization::CustomizationService,
    pub media: media::MediaService,
    pub chat: chat::ChatService,
    repository: Repository,
}

impl Services {
    /// Wire every service over one repository and the external collaborators
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        media_store: Arc<dyn media::MediaStore>,
        completion: Arc<dyn chat::CompletionClient>,
        credentials: Arc<dyn auth::CredentialStore>,
    ) -> Self {
        let media = media::MediaService::new(media_store, config.media.max_upload_bytes);
        Self {
            auth: auth::AuthService::new(credentials, config.auth.clone()),
            packages: packages::PackagesService::new(repository.clone(), media.clone()),
            contacts: contacts::ContactsService::new(repository.clone()),
            newsletter: newsletter::NewsletterService::new(Arc::new(repository.subscribers.clone())),
            customizations: customization::CustomizationService::new(repository.clone()),
            chat: chat::ChatService::new(repository.clone(), completion, config.chat.max_history),
            media,
            repository,
        }
    }

    /// Database reachability, for readiness probes
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
