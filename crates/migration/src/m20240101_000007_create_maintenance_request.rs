//! Create `maintenance_request`. Deleting equipment removes its requests;
//! deleting a user clears the assignment.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceRequest::Table)
                    .if_not_exists()
                    .col(uuid(MaintenanceRequest::Id).primary_key())
                    .col(string_len(MaintenanceRequest::Subject, 255).not_null())
                    .col(text_null(MaintenanceRequest::Description))
                    .col(string_len(MaintenanceRequest::RequestType, 32).not_null())
                    .col(string_len(MaintenanceRequest::Priority, 32).not_null().default("MEDIUM"))
                    .col(string_len(MaintenanceRequest::Category, 32).not_null())
                    .col(string_len(MaintenanceRequest::Status, 32).not_null().default("NEW"))
                    .col(uuid(MaintenanceRequest::EquipmentId).not_null())
                    .col(uuid(MaintenanceRequest::TeamId).not_null())
                    .col(uuid_null(MaintenanceRequest::AssignedToId))
                    .col(uuid(MaintenanceRequest::CreatedById).not_null())
                    .col(timestamp_with_time_zone_null(MaintenanceRequest::ScheduledDate))
                    .col(timestamp_with_time_zone_null(MaintenanceRequest::StartedAt))
                    .col(timestamp_with_time_zone_null(MaintenanceRequest::CompletedAt))
                    .col(double_null(MaintenanceRequest::DurationHours))
                    .col(text_null(MaintenanceRequest::CompletionNotes))
                    .col(timestamp_with_time_zone(MaintenanceRequest::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MaintenanceRequest::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_equipment")
                            .from(MaintenanceRequest::Table, MaintenanceRequest::EquipmentId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_team")
                            .from(MaintenanceRequest::Table, MaintenanceRequest::TeamId)
                            .to(MaintenanceTeam::Table, MaintenanceTeam::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_assignee")
                            .from(MaintenanceRequest::Table, MaintenanceRequest::AssignedToId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_request_creator")
                            .from(MaintenanceRequest::Table, MaintenanceRequest::CreatedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaintenanceRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MaintenanceRequest {
    Table,
    Id,
    Subject,
    Description,
    RequestType,
    Priority,
    Category,
    Status,
    EquipmentId,
    TeamId,
    AssignedToId,
    CreatedById,
    ScheduledDate,
    StartedAt,
    CompletedAt,
    DurationHours,
    CompletionNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Equipment { Table, Id }

#[derive(DeriveIden)]
enum MaintenanceTeam { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
