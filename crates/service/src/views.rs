//! Compact JSON shapes embedded in other resources.

use serde::Serialize;
use uuid::Uuid;

use models::{department, equipment, maintenance_team, user};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub team_id: Option<Uuid>,
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            avatar: u.avatar,
            team_id: u.team_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TeamRef {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
}

impl From<maintenance_team::Model> for TeamRef {
    fn from(t: maintenance_team::Model) -> Self {
        Self { id: t.id, name: t.name, specialty: t.specialty }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DepartmentRef {
    pub id: Uuid,
    pub name: String,
}

impl From<department::Model> for DepartmentRef {
    fn from(d: department::Model) -> Self {
        Self { id: d.id, name: d.name }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRef {
    pub id: Uuid,
    pub name: String,
    pub serial_number: String,
    pub category: String,
    pub status: String,
    pub location: String,
}

impl From<equipment::Model> for EquipmentRef {
    fn from(e: equipment::Model) -> Self {
        Self {
            id: e.id,
            name: e.name,
            serial_number: e.serial_number,
            category: e.category,
            status: e.status,
            location: e.location,
        }
    }
}
