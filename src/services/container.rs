//! Service Container - Centralized service access with parallel execution support.
//!
//! Handlers depend on the [`ServiceContainer`] trait, never on concrete
//! services, so API tests can swap in mocks.

use std::future::Future;
use std::sync::Arc;

use super::{
    ActivityService, AuthService, CertificateService, CompanyService, DashboardService,
    NotificationService, PermissionService, RevealService, SystemService, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{FileStore, Persistence, SecretCipher, TokenStore};
use crate::jobs::EmailQueue;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn companies(&self) -> Arc<dyn CompanyService>;

    fn certificates(&self) -> Arc<dyn CertificateService>;

    fn reveal(&self) -> Arc<dyn RevealService>;

    fn systems(&self) -> Arc<dyn SystemService>;

    fn permissions(&self) -> Arc<dyn PermissionService>;

    fn activities(&self) -> Arc<dyn ActivityService>;

    fn dashboard(&self) -> Arc<dyn DashboardService>;

    fn notifications(&self) -> Arc<dyn NotificationService>;
}

/// Infrastructure handles shared by the services
#[derive(Clone)]
pub struct ServiceDeps {
    pub tokens: Arc<dyn TokenStore>,
    pub emails: Arc<dyn EmailQueue>,
    pub files: Arc<dyn FileStore>,
    pub cipher: SecretCipher,
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    company_service: Arc<dyn CompanyService>,
    certificate_service: Arc<dyn CertificateService>,
    reveal_service: Arc<dyn RevealService>,
    system_service: Arc<dyn SystemService>,
    permission_service: Arc<dyn PermissionService>,
    activity_service: Arc<dyn ActivityService>,
    dashboard_service: Arc<dyn DashboardService>,
    notification_service: Arc<dyn NotificationService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, deps: ServiceDeps, config: Config) -> Self {
        use super::{
            ActivityReader, Authenticator, CertificateManager, CompanyManager, DashboardReader,
            ExpiryNotifier, PasswordRevealer, PermissionManager, SystemManager, UserManager,
        };

        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), deps.tokens.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            company_service: Arc::new(CompanyManager::new(uow.clone(), deps.files.clone())),
            certificate_service: Arc::new(CertificateManager::new(
                uow.clone(),
                deps.files.clone(),
                deps.cipher.clone(),
            )),
            reveal_service: Arc::new(PasswordRevealer::new(
                uow.clone(),
                deps.tokens.clone(),
                deps.emails.clone(),
                deps.cipher,
            )),
            system_service: Arc::new(SystemManager::new(uow.clone())),
            permission_service: Arc::new(PermissionManager::new(uow.clone())),
            activity_service: Arc::new(ActivityReader::new(uow.clone())),
            dashboard_service: Arc::new(DashboardReader::new(uow.clone())),
            notification_service: Arc::new(ExpiryNotifier::new(uow, deps.emails)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn companies(&self) -> Arc<dyn CompanyService> {
        self.company_service.clone()
    }

    fn certificates(&self) -> Arc<dyn CertificateService> {
        self.certificate_service.clone()
    }

    fn reveal(&self) -> Arc<dyn RevealService> {
        self.reveal_service.clone()
    }

    fn systems(&self) -> Arc<dyn SystemService> {
        self.system_service.clone()
    }

    fn permissions(&self) -> Arc<dyn PermissionService> {
        self.permission_service.clone()
    }

    fn activities(&self) -> Arc<dyn ActivityService> {
        self.activity_service.clone()
    }

    fn dashboard(&self) -> Arc<dyn DashboardService> {
        self.dashboard_service.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notification_service.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_parallel_join2_fails_fast() {
        async fn ok() -> AppResult<i32> {
            Ok(1)
        }
        async fn fail() -> AppResult<i32> {
            Err(AppError::NotFound)
        }

        let result = parallel::join2(ok(), fail()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
