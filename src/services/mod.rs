//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod access;
mod activity_service;
mod auth_service;
mod certificate_service;
mod company_service;
pub mod container;
mod dashboard_service;
mod notification_service;
mod permission_service;
mod reveal_service;
mod system_service;
mod user_service;

// Service Container
pub use container::{parallel, ServiceContainer, ServiceDeps, Services};

// Service traits and implementations
pub use activity_service::{ActivityReader, ActivityService};
pub use auth_service::{AuthService, Authenticator, Claims, LoginResult};
pub use certificate_service::{
    CertificateFile, CertificateInput, CertificateManager, CertificateService, CertificateUpdate,
};
pub use company_service::{CompanyManager, CompanyService};
pub use dashboard_service::{DashboardReader, DashboardService};
pub use notification_service::{DigestSummary, ExpiryNotifier, NotificationService};
pub use permission_service::{PermissionManager, PermissionService};
pub use reveal_service::{CodeIssued, PasswordRevealer, RevealService};
pub use system_service::{SystemManager, SystemService};
pub use user_service::{CreateUser, UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;

#[cfg(any(test, feature = "test-utils"))]
pub use {
    activity_service::MockActivityService, auth_service::MockAuthService,
    certificate_service::MockCertificateService, company_service::MockCompanyService,
    dashboard_service::MockDashboardService, notification_service::MockNotificationService,
    permission_service::MockPermissionService, reveal_service::MockRevealService,
    system_service::MockSystemService, user_service::MockUserService,
};
