//! Unit of Work pattern implementation.
//!
//! Centralizes access to every repository and runs writes that touch
//! several tables (a company delete cascading to its certificates) inside a
//! single database transaction.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel,
    TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::company;
use super::repositories::{
    ActivityRepository, ActivityStore, CertificateRepository, CertificateStore,
    CompanyRepository, CompanyStore, PermissionRepository, PermissionStore, SystemRepository,
    SystemStore, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed transaction body.
pub type TxFuture<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to the generic
/// `transaction` method. Tests provide a hand-written implementation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn companies(&self) -> Arc<dyn CompanyRepository>;

    fn certificates(&self) -> Arc<dyn CertificateRepository>;

    fn systems(&self) -> Arc<dyn SystemRepository>;

    fn permissions(&self) -> Arc<dyn PermissionRepository>;

    fn activities(&self) -> Arc<dyn ActivityRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to an open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn companies(&self) -> TxCompanyRepository<'_> {
        TxCompanyRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    companies: Arc<CompanyStore>,
    certificates: Arc<CertificateStore>,
    systems: Arc<SystemStore>,
    permissions: Arc<PermissionStore>,
    activities: Arc<ActivityStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            companies: Arc::new(CompanyStore::new(db.clone())),
            certificates: Arc::new(CertificateStore::new(db.clone())),
            systems: Arc::new(SystemStore::new(db.clone())),
            permissions: Arc::new(PermissionStore::new(db.clone())),
            activities: Arc::new(ActivityStore::new(db.clone())),
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.companies.clone()
    }

    fn certificates(&self) -> Arc<dyn CertificateRepository> {
        self.certificates.clone()
    }

    fn systems(&self) -> Arc<dyn SystemRepository> {
        self.systems.clone()
    }

    fn permissions(&self) -> Arc<dyn PermissionRepository> {
        self.permissions.clone()
    }

    fn activities(&self) -> Arc<dyn ActivityRepository> {
        self.activities.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware company operations.
pub struct TxCompanyRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxCompanyRepository<'_> {
    /// Hard delete; certificates, systems and permissions cascade.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = company::Entity::delete_by_id(id).exec(self.txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// Run `$body` inside `$uow.transaction`, binding the context to `$ctx`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
