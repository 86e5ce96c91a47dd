//! Per-company permission repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use uuid::Uuid;

use super::entities::user_permission::{self, ActiveModel, Entity as PermissionEntity};
use crate::domain::{PermissionGrant, UserPermission};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    async fn find(&self, user_id: Uuid, company_id: Uuid) -> AppResult<Option<UserPermission>>;

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserPermission>>;

    async fn list_for_company(&self, company_id: Uuid) -> AppResult<Vec<UserPermission>>;

    /// Insert or replace the flags for a (user, company) pair
    async fn upsert(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        grant: PermissionGrant,
    ) -> AppResult<UserPermission>;

    async fn delete(&self, user_id: Uuid, company_id: Uuid) -> AppResult<()>;

    /// Companies on which the user holds `can_view`
    async fn viewable_company_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;
}

pub struct PermissionStore {
    db: DatabaseConnection,
}

impl PermissionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermissionRepository for PermissionStore {
    async fn find(&self, user_id: Uuid, company_id: Uuid) -> AppResult<Option<UserPermission>> {
        let result = PermissionEntity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .filter(user_permission::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;

        Ok(result.map(UserPermission::from))
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<UserPermission>> {
        let models = PermissionEntity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(UserPermission::from).collect())
    }

    async fn list_for_company(&self, company_id: Uuid) -> AppResult<Vec<UserPermission>> {
        let models = PermissionEntity::find()
            .filter(user_permission::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(UserPermission::from).collect())
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        grant: PermissionGrant,
    ) -> AppResult<UserPermission> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            company_id: Set(company_id),
            can_view: Set(grant.can_view),
            can_edit: Set(grant.can_edit),
            can_delete: Set(grant.can_delete),
            can_view_password: Set(grant.can_view_password),
        };

        let model = PermissionEntity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    user_permission::Column::UserId,
                    user_permission::Column::CompanyId,
                ])
                .update_columns([
                    user_permission::Column::CanView,
                    user_permission::Column::CanEdit,
                    user_permission::Column::CanDelete,
                    user_permission::Column::CanViewPassword,
                ])
                .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await?;

        Ok(UserPermission::from(model))
    }

    async fn delete(&self, user_id: Uuid, company_id: Uuid) -> AppResult<()> {
        let result = PermissionEntity::delete_many()
            .filter(user_permission::Column::UserId.eq(user_id))
            .filter(user_permission::Column::CompanyId.eq(company_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn viewable_company_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = PermissionEntity::find()
            .select_only()
            .column(user_permission::Column::CompanyId)
            .filter(user_permission::Column::UserId.eq(user_id))
            .filter(user_permission::Column::CanView.eq(true))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }
}
