use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceTeam::Table)
                    .if_not_exists()
                    .col(uuid(MaintenanceTeam::Id).primary_key())
                    .col(string_len(MaintenanceTeam::Name, 128).unique_key().not_null())
                    .col(string_len(MaintenanceTeam::Specialty, 128).not_null())
                    .col(text_null(MaintenanceTeam::Description))
                    .col(timestamp_with_time_zone(MaintenanceTeam::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MaintenanceTeam::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MaintenanceTeam::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MaintenanceTeam { Table, Id, Name, Specialty, Description, CreatedAt, UpdatedAt }
