//! Contacts repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::contact::{Contact, CreateContact},
};

#[derive(Clone)]
pub struct ContactsRepository {
    pool: Pool<Postgres>,
}

impl ContactsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all submissions, newest first
    pub async fn list(&self) -> AppResult<Vec<Contact>> {
        let rows = sqlx::query_as::<_, Contact>("SELECT * FROM contacts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Store a new submission
    pub async fn create(&self, data: &CreateContact) -> AppResult<Contact> {
        let row = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, full_name, phone, email, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.full_name)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Hard delete a submission
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact {} not found", id)));
        }
        Ok(())
    }
}
