//! Certificate system database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::CertificateSystem;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificate_systems")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub certificate_id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::certificate::Entity",
        from = "Column::CertificateId",
        to = "super::certificate::Column::Id",
        on_delete = "Cascade"
    )]
    Certificate,
}

impl Related<super::certificate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CertificateSystem {
    fn from(model: Model) -> Self {
        CertificateSystem {
            id: model.id,
            certificate_id: model.certificate_id,
            name: model.name,
            url: model.url,
            description: model.description,
            created_at: model.created_at,
        }
    }
}
