//! User permission database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::UserPermission;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_password: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserPermission {
    fn from(model: Model) -> Self {
        UserPermission {
            id: model.id,
            user_id: model.user_id,
            company_id: model.company_id,
            can_view: model.can_view,
            can_edit: model.can_edit,
            can_delete: model.can_delete,
            can_view_password: model.can_view_password,
        }
    }
}
