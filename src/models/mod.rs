//! Data models for Tripdesk

pub mod chat;
pub mod contact;
pub mod customization;
pub mod enums;
pub mod media;
pub mod package;
pub mod subscriber;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

// Re-export commonly used types
pub use contact::Contact;
pub use customization::CustomizedPackage;
pub use enums::{CustomizationStatus, PackageCategory, SubscriberSource};
pub use package::{Package, PackageSummary, Registration};
pub use subscriber::Subscriber;

/// Basic `local@domain.tld` shape; deliverability is not checked.
pub static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Money columns are `NUMERIC(12, 2)`: non-negative, below 10^10, two decimals at most.
pub fn check_amount(value: Decimal, label: &str) -> Result<(), ValidationError> {
    let problem = if value < Decimal::ZERO {
        "cannot be negative"
    } else if value >= Decimal::new(10_000_000_000, 0) {
        "must be below 10000000000"
    } else if value.normalize().scale() > 2 {
        "must have at most 2 decimal places"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("amount");
    err.message = Some(format!("{} {}", label, problem).into());
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_bounds_match_storage() {
        assert!(check_amount(Decimal::ZERO, "Cost").is_ok());
        assert!(check_amount(Decimal::new(999_999_999_999, 2), "Cost").is_ok());
        assert!(check_amount(Decimal::new(459_950, 3), "Cost").is_ok());

        let err = check_amount(Decimal::new(10_000_000_000, 0), "Cost").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Cost must be below 10000000000"));
        let err = check_amount(Decimal::new(999_999, 3), "Cost").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Cost must have at most 2 decimal places"));
        let err = check_amount(Decimal::new(-1, 0), "Cost").unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Cost cannot be negative"));
    }
}
