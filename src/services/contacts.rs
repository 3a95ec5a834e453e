//! Contact form service

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::contact::{Contact, CreateContact},
    repository::Repository,
};

#[derive(Clone)]
pub struct ContactsService {
    repository: Repository,
}

impl ContactsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn submit(&self, data: CreateContact) -> AppResult<Contact> {
        let data = data.normalized();
        data.validate()?;

        let contact = self.repository.contacts.create(&data).await?;
        tracing::info!(id = %contact.id, "Contact message received");
        Ok(contact)
    }

    pub async fn list(&self) -> AppResult<Vec<Contact>> {
        self.repository.contacts.list().await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.contacts.delete(id).await?;
        tracing::info!(%id, "Contact message deleted");
        Ok(())
    }
}
