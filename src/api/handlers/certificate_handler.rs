//! Certificate handlers, including file transfer and password reveal.

use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CertificateFilter, CertificateResponse, CertificateStatus, CertificateType};
use crate::errors::{AppError, AppResult};
use crate::services::{CertificateInput, CertificateUpdate, CodeIssued};
use crate::types::{NoContent, PaginatedCertificates, PaginationParams};

/// Certificate listing filters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CertificateQuery {
    pub company_id: Option<Uuid>,
    /// valid, expiring, critical or expired
    pub status: Option<CertificateStatus>,
    /// A1 or A3
    #[serde(rename = "type")]
    pub cert_type: Option<String>,
    /// Matches name, entity or identifier
    pub search: Option<String>,
}

impl CertificateQuery {
    fn into_filter(self) -> AppResult<CertificateFilter> {
        let cert_type = self
            .cert_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| {
                CertificateType::parse(t)
                    .ok_or_else(|| AppError::bad_request(format!("Unknown certificate type: {}", t)))
            })
            .transpose()?;

        Ok(CertificateFilter {
            visible_companies: None,
            company_id: self.company_id,
            cert_type,
            status: self.status,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

/// New certificate request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCertificateRequest {
    pub company_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "e-CNPJ Matriz")]
    pub name: String,
    /// Issuing authority
    #[validate(length(min = 1, max = 255, message = "Entity is required"))]
    #[schema(example = "AC SERASA RFB v5")]
    pub entity: String,
    #[validate(length(min = 1, max = 255, message = "Identifier is required"))]
    pub identifier: String,
    #[serde(rename = "type")]
    pub cert_type: CertificateType,
    #[schema(example = "2024-01-15")]
    pub issued_date: NaiveDate,
    #[schema(example = "2025-01-15")]
    pub expiration_date: NaiveDate,
    /// Stored encrypted, never returned
    pub password: Option<String>,
}

/// Certificate update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCertificateRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Entity cannot be empty"))]
    pub entity: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Identifier cannot be empty"))]
    pub identifier: Option<String>,
    #[serde(rename = "type")]
    pub cert_type: Option<CertificateType>,
    pub issued_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// Replace the stored password
    pub password: Option<String>,
    /// Drop the stored password
    #[serde(default)]
    pub remove_password: bool,
}

/// Multipart form for the certificate file
#[derive(ToSchema)]
pub struct CertificateFileUpload {
    /// .pfx, .p12, .cer, .crt or .pem, at most 5 MiB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Confirmation code submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RevealRequest {
    #[validate(length(equal = 6, message = "Code must have 6 digits"))]
    #[schema(example = "042917")]
    pub code: String,
}

/// Revealed certificate password
#[derive(Debug, Serialize, ToSchema)]
pub struct RevealResponse {
    pub password: String,
}

pub fn certificate_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_certificates).post(create_certificate))
        .route(
            "/:id",
            get(get_certificate)
                .put(update_certificate)
                .delete(delete_certificate),
        )
        .route("/:id/file", get(download_file).post(upload_file))
        .route("/:id/password/code", post(request_code))
        .route("/:id/password/reveal", post(reveal_password))
}

/// Keep a download name header-safe.
fn attachment_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "certificate".to_string()
    } else {
        cleaned.to_string()
    }
}

/// List certificates with derived status
#[utoipa::path(
    get,
    path = "/api/certificates",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(CertificateQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of certificates", body = PaginatedCertificates),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_certificates(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<CertificateQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<PaginatedCertificates>> {
    let filter = query.into_filter()?;
    let certificates = state
        .services
        .certificates()
        .list(&current_user.actor(), filter, page)
        .await?;
    Ok(Json(certificates))
}

/// Register a certificate
#[utoipa::path(
    post,
    path = "/api/certificates",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    request_body = CreateCertificateRequest,
    responses(
        (status = 201, description = "Certificate created", body = CertificateResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No edit permission on the company"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn create_certificate(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCertificateRequest>,
) -> AppResult<(StatusCode, Json<CertificateResponse>)> {
    let certificate = state
        .services
        .certificates()
        .create(
            &current_user.actor(),
            CertificateInput {
                company_id: payload.company_id,
                name: payload.name,
                entity: payload.entity,
                identifier: payload.identifier,
                cert_type: payload.cert_type,
                issued_date: payload.issued_date,
                expiration_date: payload.expiration_date,
                password: payload.password,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

/// Get a certificate
#[utoipa::path(
    get,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Certificate", body = CertificateResponse),
        (status = 403, description = "No view permission"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn get_certificate(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CertificateResponse>> {
    let certificate = state
        .services
        .certificates()
        .get(&current_user.actor(), id)
        .await?;
    Ok(Json(certificate))
}

/// Update a certificate
#[utoipa::path(
    put,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    request_body = UpdateCertificateRequest,
    responses(
        (status = 200, description = "Certificate updated", body = CertificateResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No edit permission"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn update_certificate(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCertificateRequest>,
) -> AppResult<Json<CertificateResponse>> {
    let certificate = state
        .services
        .certificates()
        .update(
            &current_user.actor(),
            id,
            CertificateUpdate {
                name: payload.name,
                entity: payload.entity,
                identifier: payload.identifier,
                cert_type: payload.cert_type,
                issued_date: payload.issued_date,
                expiration_date: payload.expiration_date,
                password: payload.password,
                remove_password: payload.remove_password,
            },
        )
        .await?;
    Ok(Json(certificate))
}

/// Delete a certificate
#[utoipa::path(
    delete,
    path = "/api/certificates/{id}",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 204, description = "Certificate deleted"),
        (status = 403, description = "No delete permission"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn delete_certificate(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .certificates()
        .delete(&current_user.actor(), id)
        .await?;
    Ok(NoContent)
}

/// Upload the certificate file (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/certificates/{id}/file",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    request_body(content = CertificateFileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = CertificateResponse),
        (status = 400, description = "Missing, empty or unsupported file"),
        (status = 403, description = "No edit permission"),
        (status = 404, description = "Certificate not found"),
        (status = 413, description = "File larger than 5 MiB")
    )
)]
pub async fn upload_file(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<CertificateResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("File name is missing"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        let certificate = state
            .services
            .certificates()
            .upload_file(&current_user.actor(), id, file_name, bytes.to_vec())
            .await?;
        return Ok(Json(certificate));
    }

    Err(AppError::bad_request("Multipart field `file` is required"))
}

/// Download the certificate file
#[utoipa::path(
    get,
    path = "/api/certificates/{id}/file",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 403, description = "No view permission"),
        (status = 404, description = "Certificate or file not found")
    )
)]
pub async fn download_file(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let file = state
        .services
        .certificates()
        .download_file(&current_user.actor(), id)
        .await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        attachment_name(&file.file_name)
    ))
    .map_err(|e| AppError::internal(e.to_string()))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Email a confirmation code for revealing the password
#[utoipa::path(
    post,
    path = "/api/certificates/{id}/password/code",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Code sent by email", body = CodeIssued),
        (status = 400, description = "Certificate has no stored password"),
        (status = 403, description = "No view-password permission"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn request_code(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CodeIssued>> {
    let issued = state
        .services
        .reveal()
        .request_code(&current_user.actor(), id)
        .await?;
    Ok(Json(issued))
}

/// Reveal the password with a confirmation code
#[utoipa::path(
    post,
    path = "/api/certificates/{id}/password/reveal",
    tag = "Certificates",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    request_body = RevealRequest,
    responses(
        (status = 200, description = "Decrypted password", body = RevealResponse),
        (status = 400, description = "Invalid or expired code"),
        (status = 403, description = "No view-password permission"),
        (status = 404, description = "Certificate not found"),
        (status = 429, description = "Too many wrong codes")
    )
)]
pub async fn reveal_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RevealRequest>,
) -> AppResult<Json<RevealResponse>> {
    let password = state
        .services
        .reveal()
        .reveal(&current_user.actor(), id, payload.code)
        .await?;
    Ok(Json(RevealResponse { password }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_name_is_header_safe() {
        assert_eq!(attachment_name("e-CNPJ Matriz.pfx"), "e-CNPJ Matriz.pfx");
        assert_eq!(attachment_name("Pão \"Quente\".p12"), "P_o _Quente_.p12");
        assert_eq!(attachment_name("\"\""), "__");
        assert_eq!(attachment_name("   "), "certificate");
    }

    #[test]
    fn test_query_rejects_unknown_type() {
        let query = CertificateQuery {
            cert_type: Some("A2".into()),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_query_ignores_blank_values() {
        let query = CertificateQuery {
            cert_type: Some(String::new()),
            search: Some("  ".into()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.cert_type.is_none());
        assert!(filter.search.is_none());
    }
}
