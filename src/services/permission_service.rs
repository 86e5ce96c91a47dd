//! Per-company permission administration.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::access::record_activity;
use crate::domain::{
    ActivityAction, ActivityEntity, Actor, NewActivity, PermissionGrant, UserPermission,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PermissionService: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserPermission>>;

    /// Create or replace the flags for (user, company)
    async fn upsert(
        &self,
        actor: &Actor,
        user_id: Uuid,
        company_id: Uuid,
        grant: PermissionGrant,
    ) -> AppResult<UserPermission>;

    async fn delete(&self, actor: &Actor, user_id: Uuid, company_id: Uuid) -> AppResult<()>;
}

pub struct PermissionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PermissionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> PermissionService for PermissionManager<U> {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserPermission>> {
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.uow.permissions().list_for_user(user_id).await
    }

    async fn upsert(
        &self,
        actor: &Actor,
        user_id: Uuid,
        company_id: Uuid,
        grant: PermissionGrant,
    ) -> AppResult<UserPermission> {
        self.uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.uow
            .companies()
            .find_by_id(company_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let permission = self
            .uow
            .permissions()
            .upsert(user_id, company_id, grant)
            .await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::Permission)
                .entity_id(permission.id)
                .details(json!({
                    "user_id": user_id,
                    "company_id": company_id,
                    "can_view": grant.can_view,
                    "can_edit": grant.can_edit,
                    "can_delete": grant.can_delete,
                    "can_view_password": grant.can_view_password,
                })),
        )
        .await;

        Ok(permission)
    }

    async fn delete(&self, actor: &Actor, user_id: Uuid, company_id: Uuid) -> AppResult<()> {
        self.uow.permissions().delete(user_id, company_id).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Delete, ActivityEntity::Permission)
                .details(json!({ "user_id": user_id, "company_id": company_id })),
        )
        .await;

        Ok(())
    }
}
