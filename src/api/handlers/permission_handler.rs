//! Permission administration handlers (admin only).

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{PermissionGrant, UserPermission};
use crate::errors::AppResult;
use crate::types::NoContent;

/// Permission flags for one company
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPermissionRequest {
    pub company_id: Uuid,
    #[serde(flatten)]
    pub grant: PermissionGrant,
}

/// Routes nested under `/users`
pub fn permission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/permissions",
            get(list_permissions).put(set_permission),
        )
        .route("/:id/permissions/:company_id", delete(delete_permission))
}

/// List a user's company permissions
#[utoipa::path(
    get,
    path = "/api/users/{id}/permissions",
    tag = "Permissions",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Permissions", body = Vec<UserPermission>),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_permissions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<UserPermission>>> {
    require_admin(&current_user)?;
    let permissions = state.services.permissions().list_for_user(user_id).await?;
    Ok(Json(permissions))
}

/// Create or replace a user's permissions on a company
#[utoipa::path(
    put,
    path = "/api/users/{id}/permissions",
    tag = "Permissions",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetPermissionRequest,
    responses(
        (status = 200, description = "Permission stored", body = UserPermission),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User or company not found")
    )
)]
pub async fn set_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SetPermissionRequest>,
) -> AppResult<Json<UserPermission>> {
    require_admin(&current_user)?;
    let permission = state
        .services
        .permissions()
        .upsert(
            &current_user.actor(),
            user_id,
            payload.company_id,
            payload.grant,
        )
        .await?;
    Ok(Json(permission))
}

/// Remove a user's permissions on a company
#[utoipa::path(
    delete,
    path = "/api/users/{id}/permissions/{company_id}",
    tag = "Permissions",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("company_id" = Uuid, Path, description = "Company ID")
    ),
    responses(
        (status = 204, description = "Permission removed"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Permission not found")
    )
)]
pub async fn delete_permission(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path((user_id, company_id)): Path<(Uuid, Uuid)>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state
        .services
        .permissions()
        .delete(&current_user.actor(), user_id, company_id)
        .await?;
    Ok(NoContent)
}
