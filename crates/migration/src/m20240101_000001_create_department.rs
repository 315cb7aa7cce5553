use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(uuid(Department::Id).primary_key())
                    .col(string_len(Department::Name, 128).unique_key().not_null())
                    .col(text_null(Department::Description))
                    .col(string_len_null(Department::Location, 255))
                    .col(timestamp_with_time_zone(Department::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Department::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Department::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Department { Table, Id, Name, Description, Location, CreatedAt, UpdatedAt }
