//! Certificate database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Certificate, CertificateType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub entity: String,
    pub identifier: String,
    pub cert_type: String,
    pub issued_date: Date,
    pub expiration_date: Date,
    pub password: Option<String>,
    pub file_path: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(has_many = "super::certificate_system::Entity")]
    Systems,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::certificate_system::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Systems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Certificate {
    fn from(model: Model) -> Self {
        Certificate {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            entity: model.entity,
            identifier: model.identifier,
            // Column is constrained by the schema; unknown values read as A1
            cert_type: CertificateType::parse(&model.cert_type).unwrap_or(CertificateType::A1),
            issued_date: model.issued_date,
            expiration_date: model.expiration_date,
            encrypted_password: model.password,
            file_path: model.file_path,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
