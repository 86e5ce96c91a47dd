//! Connectivity checks for the health endpoint.

use async_trait::async_trait;

use super::{Cache, Database};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Error text of each backing service, `None` when healthy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub database: Option<String>,
    pub redis: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.database.is_none() && self.redis.is_none()
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> HealthReport;
}

/// Pings Postgres and Redis concurrently.
pub struct InfraHealth {
    database: Database,
    cache: Cache,
}

impl InfraHealth {
    pub fn new(database: Database, cache: Cache) -> Self {
        Self { database, cache }
    }
}

#[async_trait]
impl HealthCheck for InfraHealth {
    async fn check(&self) -> HealthReport {
        let (database, redis) = tokio::join!(self.database.ping(), self.cache.ping());
        HealthReport {
            database: database.err().map(|e| e.to_string()),
            redis: redis.err().map(|e| e.to_string()),
        }
    }
}
