//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Redis cache (sessions, reveal codes, rate limits)
//! - Password encryption and certificate file storage
//! - Unit of Work for transaction management

pub mod cache;
pub mod crypto;
pub mod db;
pub mod health;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use cache::{Cache, RateLimiter, TokenStore};
pub use crypto::SecretCipher;
pub use db::{Database, Migrator};
pub use health::{HealthCheck, HealthReport, InfraHealth};
pub use repositories::{
    ActivityRepository, CertificateRepository, CompanyRepository, PermissionRepository,
    SystemRepository, UserRepository,
};
pub use storage::{FileStore, LocalFileStorage};
pub use unit_of_work::{Persistence, TransactionContext, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::{MockRateLimiter, MockTokenStore};
#[cfg(any(test, feature = "test-utils"))]
pub use health::MockHealthCheck;
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockFileStore;
