//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_companies_table;
mod m20240101_000003_create_certificates_table;
mod m20240101_000004_create_certificate_systems_table;
mod m20240101_000005_create_user_permissions_table;
mod m20240101_000006_create_activity_logs_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_companies_table::Migration),
            Box::new(m20240101_000003_create_certificates_table::Migration),
            Box::new(m20240101_000004_create_certificate_systems_table::Migration),
            Box::new(m20240101_000005_create_user_permissions_table::Migration),
            Box::new(m20240101_000006_create_activity_logs_table::Migration),
        ]
    }
}
