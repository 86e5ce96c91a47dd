//! Repository layer - Data access abstraction
//!
//! One repository per aggregate, each a trait with a SeaORM-backed store.

mod activity_repository;
mod certificate_repository;
mod company_repository;
pub(crate) mod entities;
mod permission_repository;
mod system_repository;
mod user_repository;

pub use activity_repository::{ActivityRepository, ActivityStore};
pub use certificate_repository::{CertificateRepository, CertificateStore};
pub use company_repository::{CompanyRepository, CompanyStore};
pub use permission_repository::{PermissionRepository, PermissionStore};
pub use system_repository::{SystemRepository, SystemStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use activity_repository::MockActivityRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use certificate_repository::MockCertificateRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use company_repository::MockCompanyRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use permission_repository::MockPermissionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use system_repository::MockSystemRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
