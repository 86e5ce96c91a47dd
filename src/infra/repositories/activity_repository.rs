//! Activity log repository (append-only).

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::activity_log::{self, ActiveModel, Entity as ActivityEntity};
use crate::domain::{ActivityFilter, ActivityLog, NewActivity};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn insert(&self, entry: NewActivity) -> AppResult<ActivityLog>;

    /// Filtered page, newest first, plus the total match count
    async fn list(
        &self,
        filter: ActivityFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<ActivityLog>, u64)>;
}

pub struct ActivityStore {
    db: DatabaseConnection,
}

impl ActivityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepository for ActivityStore {
    async fn insert(&self, entry: NewActivity) -> AppResult<ActivityLog> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(entry.user_id),
            action: Set(entry.action.as_str().to_string()),
            entity: Set(entry.entity.as_str().to_string()),
            entity_id: Set(entry.entity_id),
            details: Set(entry.details),
            timestamp: Set(chrono::Utc::now()),
            ip_address: Set(entry.ip_address),
        }
        .insert(&self.db)
        .await?;

        ActivityLog::try_from(model)
    }

    async fn list(
        &self,
        filter: ActivityFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<ActivityLog>, u64)> {
        let mut query = ActivityEntity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(activity_log::Column::UserId.eq(user_id));
        }
        if let Some(action) = filter.action {
            query = query.filter(activity_log::Column::Action.eq(action.as_str()));
        }
        if let Some(entity) = filter.entity {
            query = query.filter(activity_log::Column::Entity.eq(entity.as_str()));
        }

        let total = query.clone().count(&self.db).await?;
        let models = query
            .order_by_desc(activity_log::Column::Timestamp)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let entries = models
            .into_iter()
            .map(ActivityLog::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((entries, total))
    }
}
