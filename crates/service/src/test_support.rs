#![cfg(test)]
use chrono::Utc;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::{equipment, maintenance_team, user, EquipmentCategory, EquipmentStatus, Role};

use crate::access::Actor;

/// Fresh in-memory database per test; nothing is shared between tests.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    Ok(models::db::connect_memory().await?)
}

pub async fn seed_team(db: &DatabaseConnection, name: &str) -> Result<maintenance_team::Model, anyhow::Error> {
    Ok(maintenance_team::create(db, name, "General", None).await?)
}

pub async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
    team_id: Option<Uuid>,
) -> Result<user::Model, anyhow::Error> {
    Ok(user::create(db, user::NewUser {
        email: email.into(),
        first_name: "Seed".into(),
        last_name: "User".into(),
        role,
        team_id,
        verification_code: None,
        verification_code_expires_at: None,
        is_verified: true,
    })
    .await?)
}

pub async fn seed_equipment(
    db: &DatabaseConnection,
    team_id: Uuid,
    serial: &str,
    department_id: Option<Uuid>,
) -> Result<equipment::Model, anyhow::Error> {
    Ok(equipment::create(db, equipment::NewEquipment {
        name: format!("Machine {serial}"),
        serial_number: serial.into(),
        category: EquipmentCategory::Machinery,
        purchase_date: Utc::now().into(),
        warranty_expiry: None,
        location: "Plant".into(),
        status: EquipmentStatus::Active,
        department_id,
        maintenance_team_id: team_id,
        owner_id: None,
    })
    .await?)
}

pub fn actor_of(u: &user::Model) -> Actor {
    Actor { id: u.id, role: u.role().unwrap_or_default(), team_id: u.team_id }
}
