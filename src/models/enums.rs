//! Shared domain enums stored as TEXT columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements string conversion and TEXT column mapping for a fieldless enum.
macro_rules! text_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $slug:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $slug,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($slug => Ok($ty::$variant),)+
                    other => Err(format!("Invalid {}: {}", $label, other)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// PackageCategory
// ---------------------------------------------------------------------------

/// Catalog category of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PackageCategory {
    #[default]
    Domestic,
    International,
    Honeymoon,
    Adventure,
    Family,
    Pilgrimage,
}

text_enum!(PackageCategory, "package category", {
    Domestic => "domestic",
    International => "international",
    Honeymoon => "honeymoon",
    Adventure => "adventure",
    Family => "family",
    Pilgrimage => "pilgrimage",
});

// ---------------------------------------------------------------------------
// SubscriberSource
// ---------------------------------------------------------------------------

/// Where a newsletter subscription came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberSource {
    #[default]
    Footer,
    Popup,
    ContactForm,
    Manual,
}

text_enum!(SubscriberSource, "subscriber source", {
    Footer => "footer",
    Popup => "popup",
    ContactForm => "contact_form",
    Manual => "manual",
});

// ---------------------------------------------------------------------------
// CustomizationStatus
// ---------------------------------------------------------------------------

/// Review state of a customized-package request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CustomizationStatus {
    #[default]
    Pending,
    Reviewed,
    Confirmed,
}

text_enum!(CustomizationStatus, "customization status", {
    Pending => "pending",
    Reviewed => "reviewed",
    Confirmed => "confirmed",
});
