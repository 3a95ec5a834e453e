//! Packages repository (packages + their registrations)

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{types::Json, FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::PackageCategory,
        package::{
            InclusionsExclusions, Itinerary, MarkdownMap, Package, PackageInput, PackageSummary,
            RegisterRequest, Registration,
        },
    },
};

#[derive(Debug, FromRow)]
struct PackageRow {
    id: String,
    location: String,
    title: String,
    description: String,
    tags: Vec<String>,
    days: i32,
    nights: i32,
    cost_per_person: Decimal,
    best_time_to_visit: String,
    video_url: Option<String>,
    category: PackageCategory,
    trip_highlight: Json<MarkdownMap>,
    itinerary: Json<Itinerary>,
    inclusions_exclusions: Json<InclusionsExclusions>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PackageRow {
    fn into_package(self, registrations: Vec<Registration>) -> Package {
        Package {
            id: self.id,
            location: self.location,
            title: self.title,
            description: self.description,
            tags: self.tags,
            days: self.days,
            nights: self.nights,
            cost_per_person: self.cost_per_person,
            best_time_to_visit: self.best_time_to_visit,
            video_url: self.video_url,
            category: self.category,
            trip_highlight: self.trip_highlight.0,
            itinerary: self.itinerary.0,
            inclusions_exclusions: self.inclusions_exclusions.0,
            images: self.images,
            registrations,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RegistrationRow {
    package_id: String,
    name: String,
    email: String,
    phone: String,
    registered_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Registration {
            name: row.name,
            email: row.email,
            phone: row.phone,
            registered_at: row.registered_at,
        }
    }
}

const PACKAGE_COLUMNS: &str = "id, location, title, description, tags, days, nights, \
     cost_per_person, best_time_to_visit, video_url, category, trip_highlight, itinerary, \
     inclusions_exclusions, images, created_at, updated_at";

/// Serialized as text so the JSON column keeps key order
fn json_text<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize package field: {}", e)))
}

/// Escape LIKE wildcards in user-supplied search text
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct PackagesRepository {
    pool: Pool<Postgres>,
}

impl PackagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all packages, newest first
    pub async fn list(&self) -> AppResult<Vec<Package>> {
        let rows = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {} FROM packages ORDER BY created_at DESC, id DESC",
            PACKAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_registrations(rows).await
    }

    /// Case-insensitive substring search over title, location, description and tags
    pub async fn search(&self, text: &str) -> AppResult<Vec<Package>> {
        let rows = sqlx::query_as::<_, PackageRow>(&format!(
            r#"
            SELECT {} FROM packages
            WHERE title ILIKE $1
               OR location ILIKE $1
               OR description ILIKE $1
               OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $1)
            ORDER BY created_at DESC, id DESC
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(like_pattern(text))
        .fetch_all(&self.pool)
        .await?;

        self.attach_registrations(rows).await
    }

    /// Get a package by its public id
    pub async fn get_by_id(&self, id: &str) -> AppResult<Package> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {} FROM packages WHERE id = $1",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Package {} not found", id)))?;

        let registrations = self.registrations(id).await?;
        Ok(row.into_package(registrations))
    }

    /// Whether a package with this id exists
    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM packages WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Lightweight projection of every package, newest first
    pub async fn summaries(&self) -> AppResult<Vec<PackageSummary>> {
        let rows = sqlx::query_as::<_, PackageSummary>(
            r#"
            SELECT id, title, location, days, nights, cost_per_person,
                   best_time_to_visit, category, images
            FROM packages
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a package under a server-generated id
    pub async fn create(&self, id: &str, data: &PackageInput) -> AppResult<Package> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            r#"
            INSERT INTO packages (
                id, location, title, description, tags, days, nights,
                cost_per_person, best_time_to_visit, video_url, category,
                trip_highlight, itinerary, inclusions_exclusions, images
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12::json, $13::json, $14, $15)
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .bind(&data.location)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.tags)
        .bind(data.days)
        .bind(data.nights)
        .bind(data.cost_per_person)
        .bind(&data.best_time_to_visit)
        .bind(&data.video_url)
        .bind(data.category_or_default())
        .bind(json_text(&data.trip_highlight)?)
        .bind(json_text(&data.itinerary)?)
        .bind(Json(&data.inclusions_exclusions))
        .bind(&data.images)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Package {} already exists", id))
            }
            other => AppError::Database(other),
        })?;

        Ok(row.into_package(Vec::new()))
    }

    /// Replace every editable field of a package; id and registrations are kept
    pub async fn update(&self, id: &str, data: &PackageInput) -> AppResult<Package> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            r#"
            UPDATE packages SET
                location = $2, title = $3, description = $4, tags = $5,
                days = $6, nights = $7, cost_per_person = $8, best_time_to_visit = $9,
                video_url = $10, category = $11, trip_highlight = $12::json, itinerary = $13::json,
                inclusions_exclusions = $14, images = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .bind(&data.location)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.tags)
        .bind(data.days)
        .bind(data.nights)
        .bind(data.cost_per_person)
        .bind(&data.best_time_to_visit)
        .bind(&data.video_url)
        .bind(data.category_or_default())
        .bind(json_text(&data.trip_highlight)?)
        .bind(json_text(&data.itinerary)?)
        .bind(Json(&data.inclusions_exclusions))
        .bind(&data.images)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Package {} not found", id)))?;

        let registrations = self.registrations(id).await?;
        Ok(row.into_package(registrations))
    }

    /// Delete a package (registrations cascade) and return its image URLs
    pub async fn delete(&self, id: &str) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, Vec<String>>("DELETE FROM packages WHERE id = $1 RETURNING images")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Package {} not found", id)))
    }

    /// Registrations of one package in registration order
    pub async fn registrations(&self, package_id: &str) -> AppResult<Vec<Registration>> {
        let rows = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT package_id, name, email, phone, registered_at
            FROM registrations
            WHERE package_id = $1
            ORDER BY registered_at, id
            "#,
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Registration::from).collect())
    }

    /// Append a registration unless this email already registered for the package.
    /// Returns `None` when the (package, email) pair already exists.
    pub async fn add_registration(
        &self,
        package_id: &str,
        data: &RegisterRequest,
    ) -> AppResult<Option<Registration>> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            INSERT INTO registrations (package_id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (package_id, email) DO NOTHING
            RETURNING package_id, name, email, phone, registered_at
            "#,
        )
        .bind(package_id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!("Package {} not found", package_id))
            }
            other => AppError::Database(other),
        })?;

        Ok(row.map(Registration::from))
    }

    async fn attach_registrations(&self, rows: Vec<PackageRow>) -> AppResult<Vec<Package>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let registration_rows = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT package_id, name, email, phone, registered_at
            FROM registrations
            WHERE package_id = ANY($1)
            ORDER BY registered_at, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_package: HashMap<String, Vec<Registration>> = HashMap::new();
        for row in registration_rows {
            by_package
                .entry(row.package_id.clone())
                .or_default()
                .push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let registrations = by_package.remove(&row.id).unwrap_or_default();
                row.into_package(registrations)
            })
            .collect())
    }
}
