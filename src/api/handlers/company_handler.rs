//! Company handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Company;
use crate::errors::AppResult;
use crate::types::NoContent;

/// New company request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "Padaria Pão Quente Ltda")]
    pub name: String,
    /// CNPJ or CPF, with or without punctuation
    #[validate(length(min = 11, max = 18, message = "Identifier must be a CNPJ or CPF"))]
    #[schema(example = "11.222.333/0001-81")]
    pub identifier: String,
}

/// Company update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 11, max = 18, message = "Identifier must be a CNPJ or CPF"))]
    pub identifier: Option<String>,
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
}

/// List visible companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Companies the user may view", body = Vec<Company>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_companies(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Company>>> {
    let companies = state
        .services
        .companies()
        .list(&current_user.actor())
        .await?;
    Ok(Json(companies))
}

/// Register a company (admins and managers)
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = Company),
        (status = 400, description = "Invalid name or tax identifier"),
        (status = 403, description = "Forbidden - Admins and managers only"),
        (status = 409, description = "Identifier already registered")
    )
)]
pub async fn create_company(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCompanyRequest>,
) -> AppResult<(StatusCode, Json<Company>)> {
    let company = state
        .services
        .companies()
        .create(&current_user.actor(), payload.name, payload.identifier)
        .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Get a company
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 403, description = "No view permission"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn get_company(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Company>> {
    let company = state
        .services
        .companies()
        .get(&current_user.actor(), id)
        .await?;
    Ok(Json(company))
}

/// Update a company
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "Companies",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = Company),
        (status = 400, description = "Invalid name or tax identifier"),
        (status = 403, description = "No edit permission"),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Identifier already registered")
    )
)]
pub async fn update_company(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCompanyRequest>,
) -> AppResult<Json<Company>> {
    let company = state
        .services
        .companies()
        .update(&current_user.actor(), id, payload.name, payload.identifier)
        .await?;
    Ok(Json(company))
}

/// Delete a company with its certificates, systems and permissions
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 204, description = "Company deleted"),
        (status = 403, description = "No delete permission"),
        (status = 404, description = "Company not found")
    )
)]
pub async fn delete_company(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .companies()
        .delete(&current_user.actor(), id)
        .await?;
    Ok(NoContent)
}
