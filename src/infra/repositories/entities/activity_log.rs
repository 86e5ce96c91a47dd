//! Activity log database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{ActivityAction, ActivityEntity, ActivityLog};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<Json>,
    pub timestamp: DateTimeUtc,
    pub ip_address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ActivityLog {
    type Error = crate::errors::AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let action = ActivityAction::parse(&model.action).ok_or_else(|| {
            crate::errors::AppError::internal(format!("Unknown activity action: {}", model.action))
        })?;
        let entity = ActivityEntity::parse(&model.entity).ok_or_else(|| {
            crate::errors::AppError::internal(format!("Unknown activity entity: {}", model.entity))
        })?;

        Ok(ActivityLog {
            id: model.id,
            user_id: model.user_id,
            action,
            entity,
            entity_id: model.entity_id,
            details: model.details,
            timestamp: model.timestamp,
            ip_address: model.ip_address,
        })
    }
}
