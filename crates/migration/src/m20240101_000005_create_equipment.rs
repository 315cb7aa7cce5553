use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Equipment::Table)
                    .if_not_exists()
                    .col(uuid(Equipment::Id).primary_key())
                    .col(string_len(Equipment::Name, 255).not_null())
                    .col(string_len(Equipment::SerialNumber, 255).unique_key().not_null())
                    .col(string_len(Equipment::Category, 32).not_null())
                    .col(timestamp_with_time_zone(Equipment::PurchaseDate).not_null())
                    .col(timestamp_with_time_zone_null(Equipment::WarrantyExpiry))
                    .col(string_len(Equipment::Location, 255).not_null())
                    .col(string_len(Equipment::Status, 32).not_null().default("ACTIVE"))
                    .col(uuid_null(Equipment::DepartmentId))
                    .col(uuid(Equipment::MaintenanceTeamId).not_null())
                    .col(uuid_null(Equipment::OwnerId))
                    .col(timestamp_with_time_zone(Equipment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Equipment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipment_department")
                            .from(Equipment::Table, Equipment::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipment_team")
                            .from(Equipment::Table, Equipment::MaintenanceTeamId)
                            .to(MaintenanceTeam::Table, MaintenanceTeam::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_equipment_owner")
                            .from(Equipment::Table, Equipment::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Equipment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Equipment {
    Table,
    Id,
    Name,
    SerialNumber,
    Category,
    PurchaseDate,
    WarrantyExpiry,
    Location,
    Status,
    DepartmentId,
    MaintenanceTeamId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Department { Table, Id }

#[derive(DeriveIden)]
enum MaintenanceTeam { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
