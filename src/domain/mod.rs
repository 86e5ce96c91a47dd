//! Domain layer - Core business entities and logic
//!
//! Plain records for users, companies, certificates and their systems,
//! per-company permissions and the activity log. The only business rule,
//! certificate status, lives in [`status`].

pub mod activity;
pub mod certificate;
pub mod company;
pub mod dashboard;
pub mod password;
pub mod permission;
pub mod session;
pub mod status;
pub mod system;
pub mod tax_id;
pub mod user;

pub use activity::{ActivityAction, ActivityEntity, ActivityFilter, ActivityLog, NewActivity};
pub use certificate::{
    Certificate, CertificateChanges, CertificateFilter, CertificateResponse, CertificateType,
    NewCertificate,
};
pub use company::{Company, CompanyChanges, NewCompany};
pub use dashboard::{DashboardStats, StatusCounts, TypeCounts};
pub use password::Password;
pub use permission::{is_permitted, PermissionGrant, PermissionKind, UserPermission};
pub use session::{RevealCode, Session};
pub use status::{certificate_status, days_remaining, today, CertificateStatus};
pub use system::{CertificateSystem, CertificateSystemChanges, NewCertificateSystem};
pub use tax_id::{normalize_tax_id, TaxIdKind};
pub use user::{Actor, NewUser, User, UserChanges, UserResponse, UserRole};
