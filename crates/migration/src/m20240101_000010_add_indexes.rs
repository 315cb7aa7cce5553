use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Requests: kanban, team scoping, equipment badge, calendar
        manager
            .create_index(
                Index::create()
                    .name("idx_request_status")
                    .table(MaintenanceRequest::Table)
                    .col(MaintenanceRequest::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_request_team")
                    .table(MaintenanceRequest::Table)
                    .col(MaintenanceRequest::TeamId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_request_equipment")
                    .table(MaintenanceRequest::Table)
                    .col(MaintenanceRequest::EquipmentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_request_scheduled_date")
                    .table(MaintenanceRequest::Table)
                    .col(MaintenanceRequest::ScheduledDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_equipment_department")
                    .table(Equipment::Table)
                    .col(Equipment::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_team")
                    .table(Users::Table)
                    .col(Users::TeamId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in ["idx_request_status", "idx_request_team", "idx_request_equipment", "idx_request_scheduled_date"] {
            manager
                .drop_index(Index::drop().name(name).table(MaintenanceRequest::Table).to_owned())
                .await?;
        }
        manager
            .drop_index(Index::drop().name("idx_equipment_department").table(Equipment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_users_team").table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MaintenanceRequest { Table, Status, TeamId, EquipmentId, ScheduledDate }

#[derive(DeriveIden)]
enum Equipment { Table, DepartmentId }

#[derive(DeriveIden)]
enum Users { Table, TeamId }
