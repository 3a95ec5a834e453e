//! Package model and related types

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{check_amount, enums::PackageCategory, EMAIL_PATTERN};

/// Ordered mapping of heading -> Markdown body
pub type MarkdownMap = IndexMap<String, String>;

/// Day-by-day plan of a package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Itinerary {
    #[serde(default)]
    pub description: String,
    /// Day key (e.g. "day1") -> Markdown body
    #[serde(default)]
    pub days: MarkdownMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InclusionsExclusions {
    #[serde(default)]
    pub inclusions: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// A visitor's registration of interest, listed under its package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub registered_at: DateTime<Utc>,
}

/// Package record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Package {
    /// Public identifier used in URLs
    pub id: String,
    pub location: String,
    pub title: String,
    /// Markdown
    pub description: String,
    pub tags: Vec<String>,
    pub days: i32,
    pub nights: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub cost_per_person: Decimal,
    pub best_time_to_visit: String,
    pub video_url: Option<String>,
    pub category: PackageCategory,
    /// Highlight category -> Markdown body
    pub trip_highlight: MarkdownMap,
    pub itinerary: Itinerary,
    pub inclusions_exclusions: InclusionsExclusions,
    pub images: Vec<String>,
    pub registrations: Vec<Registration>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight projection of a package used to brief the chat assistant
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PackageSummary {
    pub id: String,
    pub title: String,
    pub location: String,
    pub days: i32,
    pub nights: i32,
    pub cost_per_person: Decimal,
    pub best_time_to_visit: String,
    pub category: PackageCategory,
    pub images: Vec<String>,
}

/// Create / full-replace package request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "valid_cost", skip_on_field_errors = false))]
pub struct PackageInput {
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(range(min = 1, max = 365, message = "Days must be between 1 and 365"))]
    pub days: i32,
    #[validate(range(min = 1, max = 365, message = "Nights must be between 1 and 365"))]
    pub nights: i32,
    #[serde(default, with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub cost_per_person: Decimal,
    #[serde(default)]
    pub best_time_to_visit: String,
    #[validate(url(message = "Video URL must be a valid URL"))]
    pub video_url: Option<String>,
    /// Falls back to the default category when omitted
    pub category: Option<PackageCategory>,
    #[serde(default)]
    pub trip_highlight: MarkdownMap,
    #[serde(default)]
    pub itinerary: Itinerary,
    #[serde(default)]
    pub inclusions_exclusions: InclusionsExclusions,
    #[serde(default)]
    pub images: Vec<String>,
}

impl PackageInput {
    /// Trim text fields, drop blank/duplicate tags and empty list entries.
    pub fn normalized(mut self) -> Self {
        self.location = self.location.trim().to_string();
        self.title = self.title.trim().to_string();
        self.best_time_to_visit = self.best_time_to_visit.trim().to_string();
        self.video_url = self
            .video_url
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len());
        for tag in self.tags.iter().map(|t| t.trim()) {
            if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                tags.push(tag.to_string());
            }
        }
        self.tags = tags;

        self.images.retain(|url| !url.trim().is_empty());
        self.inclusions_exclusions.inclusions.retain(|s| !s.trim().is_empty());
        self.inclusions_exclusions.exclusions.retain(|s| !s.trim().is_empty());
        self
    }

    pub fn category_or_default(&self) -> PackageCategory {
        self.category.unwrap_or_default()
    }
}

fn valid_cost(input: &PackageInput) -> Result<(), ValidationError> {
    check_amount(input.cost_per_person, "Cost per person")
}

/// Register interest in a package
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 5, max = 30, message = "Phone number is required"))]
    pub phone: String,
}

impl RegisterRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Package search query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PackageSearchQuery {
    /// Free text matched against title, location, description and tags
    pub q: Option<String>,
}
