use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::enums::{Priority, RequestStatus, RequestType};
use crate::errors::ModelError;
use crate::{equipment, maintenance_team, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_request")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: String,
    pub priority: String,
    pub category: String,
    pub status: String,
    pub equipment_id: Uuid,
    pub team_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub scheduled_date: Option<DateTimeWithTimeZone>,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub duration_hours: Option<f64>,
    pub completion_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Equipment,
    Team,
    AssignedTo,
    CreatedBy,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Equipment => Entity::belongs_to(equipment::Entity)
                .from(Column::EquipmentId)
                .to(equipment::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Team => Entity::belongs_to(maintenance_team::Entity)
                .from(Column::TeamId)
                .to(maintenance_team::Column::Id)
                .into(),
            Relation::AssignedTo => Entity::belongs_to(user::Entity)
                .from(Column::AssignedToId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
            Relation::CreatedBy => Entity::belongs_to(user::Entity)
                .from(Column::CreatedById)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<RequestStatus, ModelError> {
        self.status.parse()
    }

    pub fn request_type(&self) -> Result<RequestType, ModelError> {
        self.request_type.parse()
    }

    pub fn priority(&self) -> Result<Priority, ModelError> {
        self.priority.parse()
    }
}

/// Insert payload. `category` and `team_id` come from the equipment, not the caller.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub priority: Priority,
    pub category: String,
    pub equipment_id: Uuid,
    pub team_id: Uuid,
    pub created_by_id: Uuid,
    pub scheduled_date: Option<DateTimeWithTimeZone>,
}

pub fn validate_subject(subject: &str) -> Result<(), ModelError> {
    if subject.trim().is_empty() { return Err(ModelError::validation("subject required")); }
    if subject.len() > 255 { return Err(ModelError::validation("subject too long (<=255)")); }
    Ok(())
}

pub fn validate_duration(hours: Option<f64>) -> Result<(), ModelError> {
    match hours {
        Some(h) if !h.is_finite() || h < 0.0 => Err(ModelError::validation("durationHours must be >= 0")),
        _ => Ok(()),
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewRequest) -> Result<Model, ModelError> {
    validate_subject(&new.subject)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        subject: Set(new.subject.trim().to_string()),
        description: Set(new.description),
        request_type: Set(new.request_type.as_str().to_string()),
        priority: Set(new.priority.as_str().to_string()),
        category: Set(new.category),
        status: Set(RequestStatus::New.as_str().to_string()),
        equipment_id: Set(new.equipment_id),
        team_id: Set(new.team_id),
        assigned_to_id: Set(None),
        created_by_id: Set(new.created_by_id),
        scheduled_date: Set(new.scheduled_date),
        started_at: Set(None),
        completed_at: Set(None),
        duration_hours: Set(None),
        completion_notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_must_be_non_negative() {
        assert!(validate_duration(None).is_ok());
        assert!(validate_duration(Some(0.0)).is_ok());
        assert!(validate_duration(Some(2.5)).is_ok());
        assert!(validate_duration(Some(-1.0)).is_err());
    }

    #[test]
    fn subject_required() {
        assert!(validate_subject("  ").is_err());
        assert!(validate_subject("Leaking pipe").is_ok());
    }
}
