//! Per-company permission checks shared by the services.

use uuid::Uuid;

use crate::domain::{is_permitted, Actor, NewActivity, PermissionKind};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Fail with `Forbidden` unless `actor` holds `kind` on the company.
pub(crate) async fn ensure_company_permission<U: UnitOfWork>(
    uow: &U,
    actor: &Actor,
    company_id: Uuid,
    kind: PermissionKind,
) -> AppResult<()> {
    if actor.is_admin() {
        return Ok(());
    }

    let permission = uow.permissions().find(actor.user_id, company_id).await?;
    if is_permitted(actor.role, permission.as_ref(), kind) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %actor.user_id,
            company_id = %company_id,
            permission = ?kind,
            "Permission denied"
        );
        Err(AppError::Forbidden)
    }
}

/// Companies the actor may see; `None` means all of them.
pub(crate) async fn visible_companies<U: UnitOfWork>(
    uow: &U,
    actor: &Actor,
) -> AppResult<Option<Vec<Uuid>>> {
    if actor.is_admin() {
        Ok(None)
    } else {
        Ok(Some(
            uow.permissions().viewable_company_ids(actor.user_id).await?,
        ))
    }
}

/// Append an audit entry. Failures are logged and swallowed.
pub(crate) async fn record_activity<U: UnitOfWork>(uow: &U, entry: NewActivity) {
    let action = entry.action;
    let entity = entry.entity;
    if let Err(e) = uow.activities().insert(entry).await {
        tracing::warn!(
            error = %e,
            action = action.as_str(),
            entity = entity.as_str(),
            "Failed to record activity"
        );
    }
}
