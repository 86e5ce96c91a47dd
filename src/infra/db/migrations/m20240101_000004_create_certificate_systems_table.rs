//! Migration: Create certificate_systems table.

use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_certificates_table::Certificates;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CertificateSystems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CertificateSystems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CertificateSystems::CertificateId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CertificateSystems::Name).string().not_null())
                    .col(ColumnDef::new(CertificateSystems::Url).string().null())
                    .col(ColumnDef::new(CertificateSystems::Description).text().null())
                    .col(
                        ColumnDef::new(CertificateSystems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificate_systems_certificate")
                            .from(CertificateSystems::Table, CertificateSystems::CertificateId)
                            .to(Certificates::Table, Certificates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_certificate_systems_certificate_id")
                    .table(CertificateSystems::Table)
                    .col(CertificateSystems::CertificateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CertificateSystems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CertificateSystems {
    Table,
    Id,
    CertificateId,
    Name,
    Url,
    Description,
    CreatedAt,
}
