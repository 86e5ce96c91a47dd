//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, TransactionTrait};
use uuid::Uuid;

use certificado_guardian::domain::{
    ActivityLog, Actor, Certificate, CertificateType, Company, NewActivity, User, UserPermission,
    UserRole,
};
use certificado_guardian::errors::AppResult;
use certificado_guardian::infra::repositories::{
    MockActivityRepository, MockCertificateRepository, MockCompanyRepository,
    MockPermissionRepository, MockSystemRepository, MockUserRepository,
};
use certificado_guardian::infra::{
    ActivityRepository, CertificateRepository, CompanyRepository, PermissionRepository,
    SystemRepository, TransactionContext, TxFuture, UnitOfWork, UserRepository,
};

/// Repository mocks, configured before being frozen into a [`TestUnitOfWork`].
#[derive(Default)]
pub struct MockRepos {
    pub users: MockUserRepository,
    pub companies: MockCompanyRepository,
    pub certificates: MockCertificateRepository,
    pub systems: MockSystemRepository,
    pub permissions: MockPermissionRepository,
    pub activities: MockActivityRepository,
}

impl MockRepos {
    /// Accept any audit entry.
    pub fn allow_activity(&mut self) {
        self.activities
            .expect_insert()
            .returning(|entry| Ok(activity_log(entry)));
    }

    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        self.into_uow_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    /// Transactions run against `db`, usually a seeded [`MockDatabase`].
    pub fn into_uow_with_db(self, db: DatabaseConnection) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            db,
            users: Arc::new(self.users),
            companies: Arc::new(self.companies),
            certificates: Arc::new(self.certificates),
            systems: Arc::new(self.systems),
            permissions: Arc::new(self.permissions),
            activities: Arc::new(self.activities),
        })
    }
}

/// Hand-written UnitOfWork over mockall repositories
pub struct TestUnitOfWork {
    db: DatabaseConnection,
    users: Arc<MockUserRepository>,
    companies: Arc<MockCompanyRepository>,
    certificates: Arc<MockCertificateRepository>,
    systems: Arc<MockSystemRepository>,
    permissions: Arc<MockPermissionRepository>,
    activities: Arc<MockActivityRepository>,
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
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
        let txn = self.db.begin().await?;
        match f(TransactionContext::new(&txn)).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }
}

pub fn user(role: UserRole) -> User {
    let id = Uuid::new_v4();
    User {
        id,
        username: format!("user-{}", id.simple()),
        email: "maria@example.com".to_string(),
        password_hash: "hashed".to_string(),
        name: "Maria Silva".to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

pub fn actor(role: UserRole) -> Actor {
    Actor::new(Uuid::new_v4(), role, Some("10.0.0.1".to_string()))
}

pub fn company(id: Uuid) -> Company {
    Company {
        id,
        name: "Padaria Pão Quente Ltda".to_string(),
        identifier: "11222333000181".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn certificate(id: Uuid, company_id: Uuid, expiration_date: NaiveDate) -> Certificate {
    Certificate {
        id,
        company_id,
        name: "e-CNPJ".to_string(),
        entity: "Certisign".to_string(),
        identifier: "ABC123".to_string(),
        cert_type: CertificateType::A1,
        issued_date: expiration_date - chrono::Duration::days(365),
        expiration_date,
        encrypted_password: None,
        file_path: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn permission(
    user_id: Uuid,
    company_id: Uuid,
    can_view: bool,
    can_edit: bool,
    can_delete: bool,
    can_view_password: bool,
) -> UserPermission {
    UserPermission {
        id: Uuid::new_v4(),
        user_id,
        company_id,
        can_view,
        can_edit,
        can_delete,
        can_view_password,
    }
}

pub fn activity_log(entry: NewActivity) -> ActivityLog {
    ActivityLog {
        id: Uuid::new_v4(),
        user_id: entry.user_id,
        action: entry.action,
        entity: entry.entity,
        entity_id: entry.entity_id,
        details: entry.details,
        timestamp: Utc::now(),
        ip_address: entry.ip_address,
    }
}
