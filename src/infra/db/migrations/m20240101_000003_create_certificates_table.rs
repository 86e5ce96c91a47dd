//! Migration: Create certificates table.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_companies_table::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certificates::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Certificates::Name).string().not_null())
                    .col(ColumnDef::new(Certificates::Entity).string().not_null())
                    .col(ColumnDef::new(Certificates::Identifier).string().not_null())
                    .col(
                        ColumnDef::new(Certificates::CertType)
                            .string_len(2)
                            .not_null()
                            .check(Expr::col(Certificates::CertType).is_in(["A1", "A3"])),
                    )
                    .col(ColumnDef::new(Certificates::IssuedDate).date().not_null())
                    .col(ColumnDef::new(Certificates::ExpirationDate).date().not_null())
                    .col(ColumnDef::new(Certificates::Password).text().null())
                    .col(ColumnDef::new(Certificates::FilePath).string().null())
                    .col(
                        ColumnDef::new(Certificates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Certificates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_company")
                            .from(Certificates::Table, Certificates::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_certificates_company_id")
                    .table(Certificates::Table)
                    .col(Certificates::CompanyId)
                    .to_owned(),
            )
            .await?;

        // Status filters and the dashboard scan by expiration date
        manager
            .create_index(
                Index::create()
                    .name("idx_certificates_expiration_date")
                    .table(Certificates::Table)
                    .col(Certificates::ExpirationDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Certificates {
    Table,
    Id,
    CompanyId,
    Name,
    Entity,
    Identifier,
    CertType,
    IssuedDate,
    ExpirationDate,
    Password,
    FilePath,
    CreatedAt,
    UpdatedAt,
}
