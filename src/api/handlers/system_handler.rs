//! Handlers for systems that use a certificate.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CertificateSystem, CertificateSystemChanges};
use crate::errors::AppResult;
use crate::types::NoContent;

/// New system request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSystemRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "eSocial")]
    pub name: String,
    #[validate(url(message = "Invalid URL"))]
    #[schema(example = "https://login.esocial.gov.br")]
    pub url: Option<String>,
    pub description: Option<String>,
}

/// System update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSystemRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
    pub description: Option<String>,
}

/// Routes nested under `/certificates`
pub fn certificate_system_routes() -> Router<AppState> {
    Router::new().route("/:id/systems", get(list_systems).post(create_system))
}

/// Routes nested under `/systems`
pub fn system_routes() -> Router<AppState> {
    Router::new().route("/:id", put(update_system).delete(delete_system))
}

/// List the systems using a certificate
#[utoipa::path(
    get,
    path = "/api/certificates/{id}/systems",
    tag = "Systems",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    responses(
        (status = 200, description = "Systems", body = Vec<CertificateSystem>),
        (status = 403, description = "No view permission"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn list_systems(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(certificate_id): Path<Uuid>,
) -> AppResult<Json<Vec<CertificateSystem>>> {
    let systems = state
        .services
        .systems()
        .list(&current_user.actor(), certificate_id)
        .await?;
    Ok(Json(systems))
}

/// Link a system to a certificate
#[utoipa::path(
    post,
    path = "/api/certificates/{id}/systems",
    tag = "Systems",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Certificate ID")),
    request_body = CreateSystemRequest,
    responses(
        (status = 201, description = "System created", body = CertificateSystem),
        (status = 400, description = "Validation error"),
        (status = 403, description = "No edit permission"),
        (status = 404, description = "Certificate not found")
    )
)]
pub async fn create_system(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(certificate_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateSystemRequest>,
) -> AppResult<(StatusCode, Json<CertificateSystem>)> {
    let system = state
        .services
        .systems()
        .create(
            &current_user.actor(),
            certificate_id,
            payload.name,
            payload.url,
            payload.description,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(system)))
}

/// Update a system
#[utoipa::path(
    put,
    path = "/api/systems/{id}",
    tag = "Systems",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "System ID")),
    request_body = UpdateSystemRequest,
    responses(
        (status = 200, description = "System updated", body = CertificateSystem),
        (status = 403, description = "No edit permission"),
        (status = 404, description = "System not found")
    )
)]
pub async fn update_system(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateSystemRequest>,
) -> AppResult<Json<CertificateSystem>> {
    let system = state
        .services
        .systems()
        .update(
            &current_user.actor(),
            id,
            CertificateSystemChanges {
                name: payload.name,
                url: payload.url,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(system))
}

/// Delete a system
#[utoipa::path(
    delete,
    path = "/api/systems/{id}",
    tag = "Systems",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "System ID")),
    responses(
        (status = 204, description = "System deleted"),
        (status = 403, description = "No edit permission"),
        (status = 404, description = "System not found")
    )
)]
pub async fn delete_system(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .systems()
        .delete(&current_user.actor(), id)
        .await?;
    Ok(NoContent)
}
