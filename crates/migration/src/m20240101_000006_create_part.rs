use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Part::Table)
                    .if_not_exists()
                    .col(uuid(Part::Id).primary_key())
                    .col(string_len(Part::Name, 255).not_null())
                    .col(string_len(Part::Sku, 128).unique_key().not_null())
                    .col(text_null(Part::Description))
                    .col(integer(Part::Quantity).not_null().default(0))
                    .col(integer(Part::MinQuantity).not_null().default(0))
                    .col(double(Part::Cost).not_null().default(0.0))
                    .col(string_len_null(Part::Location, 255))
                    .col(timestamp_with_time_zone(Part::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Part::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Part::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Part { Table, Id, Name, Sku, Description, Quantity, MinQuantity, Cost, Location, CreatedAt, UpdatedAt }
