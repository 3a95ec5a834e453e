//! Repository layer for database operations

pub mod contacts;
pub mod customizations;
pub mod packages;
pub mod subscribers;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub packages: packages::PackagesRepository,
    pub contacts: contacts::ContactsRepository,
    pub subscribers: subscribers::SubscribersRepository,
    pub customizations: customizations::CustomizationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            packages: packages::PackagesRepository::new(pool.clone()),
            contacts: contacts::ContactsRepository::new(pool.clone()),
            subscribers: subscribers::SubscribersRepository::new(pool.clone()),
            customizations: customizations::CustomizationsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
