//! Chat assistant request/response types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{package::RegisterRequest, EMAIL_PATTERN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Booking submitted through the chat widget
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingData {
    #[serde(default)]
    #[validate(length(min = 1, message = "Package id is required"))]
    pub package_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(regex(path = *EMAIL_PATTERN, message = "Invalid email format"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 5, max = 30, message = "Phone number is required"))]
    pub phone: String,
}

impl BookingData {
    pub fn normalized(self) -> Self {
        Self {
            package_id: self.package_id.trim().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
        }
    }

    pub fn registration(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// One chat turn. The caller resends the whole history every time.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub booking_data: Option<BookingData>,
}

/// Structured assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub suggestions: Vec<String>,
    pub show_booking_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
}

impl ChatReply {
    /// Plain text with no structured extras
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            suggestions: Vec::new(),
            show_booking_form: false,
            package_id: None,
        }
    }
}
