//! Customized-package requests repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        customization::{CreateCustomizedPackage, CustomizedPackage},
        enums::CustomizationStatus,
    },
};

#[derive(Clone)]
pub struct CustomizationsRepository {
    pool: Pool<Postgres>,
}

impl CustomizationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a request in the `pending` state
    pub async fn create(&self, data: &CreateCustomizedPackage) -> AppResult<CustomizedPackage> {
        let row = sqlx::query_as::<_, CustomizedPackage>(
            r#"
            INSERT INTO customized_packages (
                id, package_id, user_name, user_email, user_phone,
                selected_inclusions, custom_days, custom_nights,
                custom_requests, status, price_snapshot
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.package_id)
        .bind(&data.user_name)
        .bind(&data.user_email)
        .bind(&data.user_phone)
        .bind(&data.selected_inclusions)
        .bind(data.custom_days)
        .bind(data.custom_nights)
        .bind(&data.custom_requests)
        .bind(CustomizationStatus::Pending)
        .bind(data.price_snapshot)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// List all requests, newest first
    pub async fn list(&self) -> AppResult<Vec<CustomizedPackage>> {
        let rows = sqlx::query_as::<_, CustomizedPackage>(
            "SELECT * FROM customized_packages ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
