//! Email queue backed by apalis PostgreSQL storage.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::{postgres::PgPoolOptions, PgPool};
use async_trait::async_trait;

use super::EmailJob;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Anything that can accept an email for later delivery.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmailQueue: Send + Sync {
    async fn enqueue(&self, job: EmailJob) -> AppResult<()>;
}

/// Connect the job pool and make sure the apalis tables exist.
pub async fn connect_job_pool(database_url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job pool: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(pool)
}

#[derive(Clone)]
pub struct PostgresEmailQueue {
    storage: PostgresStorage<EmailJob>,
}

impl PostgresEmailQueue {
    pub fn new(pool: PgPool) -> Self {
        Self {
            storage: PostgresStorage::new(pool),
        }
    }

    pub fn storage(&self) -> PostgresStorage<EmailJob> {
        self.storage.clone()
    }
}

#[async_trait]
impl EmailQueue for PostgresEmailQueue {
    async fn enqueue(&self, job: EmailJob) -> AppResult<()> {
        let to = job.to.clone();
        let mut storage = self.storage.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue email: {}", e)))?;

        tracing::debug!(to = %to, "Email queued");
        Ok(())
    }
}
