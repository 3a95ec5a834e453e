//! Customized-package requests

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{check_amount, enums::CustomizationStatus, EMAIL_PATTERN};

/// A visitor's requested changes to a package. `package_id` is not enforced
/// against the catalog and `price_snapshot` never follows later price edits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomizedPackage {
    pub id: Uuid,
    pub package_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub selected_inclusions: Vec<String>,
    pub custom_days: Option<i32>,
    pub custom_nights: Option<i32>,
    pub custom_requests: String,
    pub status: CustomizationStatus,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price_snapshot: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customization request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "valid_price", skip_on_field_errors = false))]
pub struct CreateCustomizedPackage {
    #[serde(default)]
    #[validate(length(min = 1, message = "Package id is required"))]
    pub package_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(regex(path = *EMAIL_PATTERN, message = "Invalid email format"))]
    pub user_email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 30, message = "Phone is required"))]
    pub user_phone: String,
    #[serde(default)]
    pub selected_inclusions: Vec<String>,
    #[validate(range(min = 1, max = 365, message = "Custom days must be between 1 and 365"))]
    pub custom_days: Option<i32>,
    #[validate(range(min = 1, max = 365, message = "Custom nights must be between 1 and 365"))]
    pub custom_nights: Option<i32>,
    #[serde(default)]
    pub custom_requests: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price_snapshot: Option<Decimal>,
}

impl CreateCustomizedPackage {
    pub fn normalized(mut self) -> Self {
        self.package_id = self.package_id.trim().to_string();
        self.user_name = self.user_name.trim().to_string();
        self.user_email = self.user_email.trim().to_lowercase();
        self.user_phone = self.user_phone.trim().to_string();
        self.custom_requests = self.custom_requests.trim().to_string();
        self.selected_inclusions.retain(|s| !s.trim().is_empty());
        self
    }
}

fn valid_price(req: &CreateCustomizedPackage) -> Result<(), ValidationError> {
    match req.price_snapshot {
        Some(price) => check_amount(price, "Price snapshot"),
        None => Ok(()),
    }
}
