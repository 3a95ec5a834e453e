//! Tripdesk travel agency server
//!
//! REST JSON API behind a travel agency website: the package catalog with
//! visitor registrations, contact and newsletter forms, customization
//! requests, admin image management and an LLM travel assistant.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
