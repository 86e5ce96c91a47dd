//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, certificate_handler, company_handler, dashboard_handler, log_handler,
    permission_handler, system_handler, user_handler,
};
use crate::config::SESSION_COOKIE;
use crate::domain::{
    ActivityAction, ActivityEntity, ActivityLog, CertificateResponse, CertificateStatus,
    CertificateSystem, CertificateType, Company, DashboardStats, PermissionGrant, StatusCounts,
    TypeCounts, UserPermission, UserResponse, UserRole,
};
use crate::services::CodeIssued;
use crate::types::{MessageResponse, PaginatedActivity, PaginatedCertificates, PaginationMeta};

/// OpenAPI documentation for CertificadoGuardian
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CertificadoGuardian API",
        version = "0.1.0",
        description = "Digital certificate inventory and expiration tracking"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        // Users
        user_handler::list_users,
        user_handler::create_user,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::restore_user,
        user_handler::change_password,
        // Permissions
        permission_handler::list_permissions,
        permission_handler::set_permission,
        permission_handler::delete_permission,
        // Companies
        company_handler::list_companies,
        company_handler::create_company,
        company_handler::get_company,
        company_handler::update_company,
        company_handler::delete_company,
        // Certificates
        certificate_handler::list_certificates,
        certificate_handler::create_certificate,
        certificate_handler::get_certificate,
        certificate_handler::update_certificate,
        certificate_handler::delete_certificate,
        certificate_handler::upload_file,
        certificate_handler::download_file,
        certificate_handler::request_code,
        certificate_handler::reveal_password,
        // Systems
        system_handler::list_systems,
        system_handler::create_system,
        system_handler::update_system,
        system_handler::delete_system,
        // Dashboard and activity
        dashboard_handler::stats,
        log_handler::list_logs,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            Company,
            CertificateType,
            CertificateStatus,
            CertificateResponse,
            CertificateSystem,
            PermissionGrant,
            UserPermission,
            ActivityAction,
            ActivityEntity,
            ActivityLog,
            DashboardStats,
            StatusCounts,
            TypeCounts,
            PaginationMeta,
            PaginatedCertificates,
            PaginatedActivity,
            MessageResponse,
            CodeIssued,
            auth_handler::LoginRequest,
            auth_handler::LoginResponse,
            user_handler::CreateUserRequest,
            user_handler::UpdateUserRequest,
            user_handler::ChangePasswordRequest,
            permission_handler::SetPermissionRequest,
            company_handler::CreateCompanyRequest,
            company_handler::UpdateCompanyRequest,
            certificate_handler::CreateCertificateRequest,
            certificate_handler::UpdateCertificateRequest,
            certificate_handler::CertificateFileUpload,
            certificate_handler::RevealRequest,
            certificate_handler::RevealResponse,
            system_handler::CreateSystemRequest,
            system_handler::UpdateSystemRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Session login and logout"),
        (name = "Users", description = "User management"),
        (name = "Permissions", description = "Per-company access flags"),
        (name = "Companies", description = "Certificate owners"),
        (name = "Certificates", description = "Certificates, files and password reveal"),
        (name = "Systems", description = "Systems that use a certificate"),
        (name = "Dashboard", description = "Expiration statistics"),
        (name = "Activity", description = "Audit log")
    )
)]
pub struct ApiDoc;

/// Session cookie and Bearer token schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
