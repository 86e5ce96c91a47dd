//! Activity log handler (admin only).

use axum::{
    extract::{Extension, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{ActivityAction, ActivityEntity, ActivityFilter};
use crate::errors::AppResult;
use crate::types::{PaginatedActivity, PaginationParams};

/// Activity log filters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    pub user_id: Option<Uuid>,
    pub action: Option<ActivityAction>,
    pub entity: Option<ActivityEntity>,
}

impl From<ActivityQuery> for ActivityFilter {
    fn from(query: ActivityQuery) -> Self {
        Self {
            user_id: query.user_id,
            action: query.action,
            entity: query.entity,
        }
    }
}

pub fn log_routes() -> Router<AppState> {
    Router::new().route("/", get(list_logs))
}

/// Activity log, newest first
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Activity",
    security(("session_cookie" = []), ("bearer_auth" = [])),
    params(ActivityQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of activity entries", body = PaginatedActivity),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_logs(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<PaginatedActivity>> {
    require_admin(&current_user)?;
    let logs = state
        .services
        .activities()
        .list(query.into(), page)
        .await?;
    Ok(Json(logs))
}
