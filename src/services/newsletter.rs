//! Newsletter subscription service

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::SubscriberSource,
        subscriber::{SubscribeOutcome, SubscribeRequest, Subscriber, SubscriberPage, SubscriberQuery},
    },
    repository::subscribers::SubscribersRepository,
};

/// Subscriber persistence used by the newsletter flow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Subscriber>>;
    async fn create(&self, email: &str, source: SubscriberSource) -> AppResult<Option<Subscriber>>;
    async fn reactivate(&self, id: Uuid, source: SubscriberSource) -> AppResult<Option<Subscriber>>;
    async fn deactivate(&self, email: &str) -> AppResult<bool>;
    async fn list_active(&self, limit: i64, offset: i64) -> AppResult<(Vec<Subscriber>, i64)>;
}

#[async_trait]
impl SubscriberStore for SubscribersRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Subscriber>> {
        SubscribersRepository::find_by_email(self, email).await
    }

    async fn create(&self, email: &str, source: SubscriberSource) -> AppResult<Option<Subscriber>> {
        SubscribersRepository::create(self, email, source).await
    }

    async fn reactivate(&self, id: Uuid, source: SubscriberSource) -> AppResult<Option<Subscriber>> {
        SubscribersRepository::reactivate(self, id, source).await
    }

    async fn deactivate(&self, email: &str) -> AppResult<bool> {
        SubscribersRepository::deactivate(self, email).await
    }

    async fn list_active(&self, limit: i64, offset: i64) -> AppResult<(Vec<Subscriber>, i64)> {
        SubscribersRepository::list_active(self, limit, offset).await
    }
}

#[derive(Clone)]
pub struct NewsletterService {
    subscribers: Arc<dyn SubscriberStore>,
}

impl NewsletterService {
    pub fn new(subscribers: Arc<dyn SubscriberStore>) -> Self {
        Self { subscribers }
    }

    /// Subscribe a new email or reactivate an unsubscribed one
    pub async fn subscribe(&self, request: SubscribeRequest) -> AppResult<SubscribeOutcome> {
        let request = SubscribeRequest {
            email: request.email.trim().to_lowercase(),
            source: request.source,
        };
        request.validate()?;
        let source = request.source.unwrap_or_default();
        let subscribers = &self.subscribers;

        if let Some(existing) = subscribers.find_by_email(&request.email).await? {
            if existing.is_active {
                return Err(already_subscribed());
            }
            // A concurrent subscribe may have reactivated it first
            return match subscribers.reactivate(existing.id, source).await? {
                Some(subscriber) => {
                    tracing::info!(id = %subscriber.id, "Subscriber reactivated");
                    Ok(SubscribeOutcome::Reactivated(subscriber))
                }
                None => Err(already_subscribed()),
            };
        }

        match subscribers.create(&request.email, source).await? {
            Some(subscriber) => {
                tracing::info!(id = %subscriber.id, %source, "Subscriber added");
                Ok(SubscribeOutcome::Created(subscriber))
            }
            None => Err(already_subscribed()),
        }
    }

    pub async fn unsubscribe(&self, email: &str) -> AppResult<()> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }

        if !self.subscribers.deactivate(&email).await? {
            return Err(AppError::NotFound("Subscriber not found".to_string()));
        }
        tracing::info!("Subscriber deactivated");
        Ok(())
    }

    pub async fn list(&self, query: &SubscriberQuery) -> AppResult<SubscriberPage> {
        let (subscribers, total) = self
            .subscribers
            .list_active(query.limit(), query.offset())
            .await?;
        Ok(SubscriberPage::new(subscribers, total, query))
    }
}

fn already_subscribed() -> AppError {
    AppError::Conflict("Email is already subscribed".to_string())
}
