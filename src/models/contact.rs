//! Contact form submissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::EMAIL_PATTERN;

/// Contact submission record (immutable once stored)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contact form payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 30, message = "Phone is required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(regex(path = *EMAIL_PATTERN, message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

impl CreateContact {
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}
