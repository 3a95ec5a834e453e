//! Newsletter subscribers repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{enums::SubscriberSource, subscriber::Subscriber},
};

#[derive(Clone)]
pub struct SubscribersRepository {
    pool: Pool<Postgres>,
}

impl SubscribersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Find a subscriber by (normalised) email, active or not
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Subscriber>> {
        let row = sqlx::query_as::<_, Subscriber>("SELECT * FROM subscribers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a new active subscriber. Returns `None` if the email already exists.
    pub async fn create(&self, email: &str, source: SubscriberSource) -> AppResult<Option<Subscriber>> {
        let row = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO subscribers (id, email, source, is_active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (email) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Reactivate an inactive subscriber in place.
    /// Returns `None` if the row is missing or already active.
    pub async fn reactivate(&self, id: Uuid, source: SubscriberSource) -> AppResult<Option<Subscriber>> {
        let row = sqlx::query_as::<_, Subscriber>(
            r#"
            UPDATE subscribers
            SET is_active = TRUE, subscribed_at = NOW(), source = $2, updated_at = NOW()
            WHERE id = $1 AND is_active = FALSE
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Soft delete. Returns false when no active subscriber has this email.
    pub async fn deactivate(&self, email: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE subscribers SET is_active = FALSE, updated_at = NOW() WHERE email = $1 AND is_active = TRUE",
        )
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Page of active subscribers, newest first, with the active total
    pub async fn list_active(&self, limit: i64, offset: i64) -> AppResult<(Vec<Subscriber>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscribers WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Subscriber>(
            r#"
            SELECT * FROM subscribers
            WHERE is_active = TRUE
            ORDER BY subscribed_at DESC, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
