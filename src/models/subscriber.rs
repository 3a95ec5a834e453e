//! Newsletter subscriber model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{enums::SubscriberSource, EMAIL_PATTERN};

/// Subscriber record. Unsubscribing only clears `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub source: SubscriberSource,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscribe request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscribeRequest {
    #[serde(default)]
    #[validate(regex(path = *EMAIL_PATTERN, message = "Invalid email format"))]
    pub email: String,
    /// Defaults to `footer`
    pub source: Option<SubscriberSource>,
}

/// Unsubscribe query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UnsubscribeQuery {
    pub email: String,
}

/// Active subscriber listing parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SubscriberQuery {
    /// Page number (1-based, default 1)
    pub page: Option<i64>,
    /// Page size (1..=100, default 20)
    pub limit: Option<i64>,
}

impl SubscriberQuery {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// Saturates so far-out pages come back empty instead of overflowing
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// One page of active subscribers
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPage {
    pub subscribers: Vec<Subscriber>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl SubscriberPage {
    pub fn new(subscribers: Vec<Subscriber>, total: i64, query: &SubscriberQuery) -> Self {
        let limit = query.limit();
        Self {
            subscribers,
            total,
            page: query.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Result of a subscribe call
#[derive(Debug)]
pub enum SubscribeOutcome {
    Created(Subscriber),
    Reactivated(Subscriber),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_bounds() {
        let q = SubscriberQuery { page: None, limit: None };
        assert_eq!((q.page(), q.limit(), q.offset()), (1, 20, 0));

        let q = SubscriberQuery { page: Some(0), limit: Some(1000) };
        assert_eq!((q.page(), q.limit()), (1, 100));

        let q = SubscriberQuery { page: Some(3), limit: Some(10) };
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let q = SubscriberQuery { page: Some(i64::MAX), limit: Some(100) };
        assert_eq!(q.offset(), i64::MAX);
        assert!(q.offset() >= 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = SubscriberQuery { page: Some(1), limit: Some(10) };
        assert_eq!(SubscriberPage::new(vec![], 0, &q).total_pages, 0);
        assert_eq!(SubscriberPage::new(vec![], 10, &q).total_pages, 1);
        assert_eq!(SubscriberPage::new(vec![], 11, &q).total_pages, 2);
    }

    #[test]
    fn source_is_optional() {
        let req: SubscribeRequest = serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert!(req.source.is_none());
        assert!(req.validate().is_ok());

        let req: SubscribeRequest =
            serde_json::from_str(r#"{"email": "a@b.com", "source": "contact_form"}"#).unwrap();
        assert_eq!(req.source, Some(SubscriberSource::ContactForm));
    }
}
