//! Migration: Create user_permissions table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_companies_table::Companies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let flag = |column: UserPermissions| {
            ColumnDef::new(column)
                .boolean()
                .not_null()
                .default(false)
                .to_owned()
        };

        manager
            .create_table(
                Table::create()
                    .table(UserPermissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPermissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserPermissions::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserPermissions::CompanyId).uuid().not_null())
                    .col(flag(UserPermissions::CanView))
                    .col(flag(UserPermissions::CanEdit))
                    .col(flag(UserPermissions::CanDelete))
                    .col(flag(UserPermissions::CanViewPassword))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_permissions_user")
                            .from(UserPermissions::Table, UserPermissions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_permissions_company")
                            .from(UserPermissions::Table, UserPermissions::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (user, company); also the upsert conflict target
        manager
            .create_index(
                Index::create()
                    .name("idx_user_permissions_user_company")
                    .table(UserPermissions::Table)
                    .col(UserPermissions::UserId)
                    .col(UserPermissions::CompanyId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPermissions::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum UserPermissions {
    Table,
    Id,
    UserId,
    CompanyId,
    CanView,
    CanEdit,
    CanDelete,
    CanViewPassword,
}
