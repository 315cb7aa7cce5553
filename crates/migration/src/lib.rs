//! Migrator registering table migrations parents first.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_department;
mod m20240101_000002_create_maintenance_team;
mod m20240101_000003_create_users;
mod m20240101_000004_create_user_credentials;
mod m20240101_000005_create_equipment;
mod m20240101_000006_create_part;
mod m20240101_000007_create_maintenance_request;
mod m20240101_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_department::Migration),
            Box::new(m20240101_000002_create_maintenance_team::Migration),
            Box::new(m20240101_000003_create_users::Migration),
            Box::new(m20240101_000004_create_user_credentials::Migration),
            Box::new(m20240101_000005_create_equipment::Migration),
            Box::new(m20240101_000006_create_part::Migration),
            Box::new(m20240101_000007_create_maintenance_request::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000010_add_indexes::Migration),
        ]
    }
}
