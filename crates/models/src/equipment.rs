use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::enums::{EquipmentCategory, EquipmentStatus};
use crate::errors::ModelError;
use crate::{department, maintenance_team, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub serial_number: String,
    pub category: String,
    pub purchase_date: DateTimeWithTimeZone,
    pub warranty_expiry: Option<DateTimeWithTimeZone>,
    pub location: String,
    pub status: String,
    pub department_id: Option<Uuid>,
    pub maintenance_team_id: Uuid,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Department,
    Team,
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Department => Entity::belongs_to(department::Entity)
                .from(Column::DepartmentId)
                .to(department::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
            Relation::Team => Entity::belongs_to(maintenance_team::Entity)
                .from(Column::MaintenanceTeamId)
                .to(maintenance_team::Column::Id)
                .into(),
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::OwnerId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::SetNull)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<EquipmentStatus, ModelError> {
        self.status.parse()
    }

    pub fn category(&self) -> Result<EquipmentCategory, ModelError> {
        self.category.parse()
    }

    pub fn is_scrapped(&self) -> bool {
        self.status == EquipmentStatus::Scrapped.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub name: String,
    pub serial_number: String,
    pub category: EquipmentCategory,
    pub purchase_date: DateTimeWithTimeZone,
    pub warranty_expiry: Option<DateTimeWithTimeZone>,
    pub location: String,
    pub status: EquipmentStatus,
    pub department_id: Option<Uuid>,
    pub maintenance_team_id: Uuid,
    pub owner_id: Option<Uuid>,
}

pub fn validate_required(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() { return Err(ModelError::Validation(format!("{field} required"))); }
    if value.len() > 255 { return Err(ModelError::Validation(format!("{field} too long (<=255)"))); }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewEquipment) -> Result<Model, ModelError> {
    validate_required("name", &new.name)?;
    validate_required("serialNumber", &new.serial_number)?;
    validate_required("location", &new.location)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name.trim().to_string()),
        serial_number: Set(new.serial_number.trim().to_string()),
        category: Set(new.category.as_str().to_string()),
        purchase_date: Set(new.purchase_date),
        warranty_expiry: Set(new.warranty_expiry),
        location: Set(new.location.trim().to_string()),
        status: Set(new.status.as_str().to_string()),
        department_id: Set(new.department_id),
        maintenance_team_id: Set(new.maintenance_team_id),
        owner_id: Set(new.owner_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn set_status<C: ConnectionTrait>(db: &C, id: Uuid, status: EquipmentStatus) -> Result<Model, ModelError> {
    let found = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("equipment {id}")))?;
    let mut am: ActiveModel = found.into();
    am.status = Set(status.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_scrap() -> Result<(), anyhow::Error> {
        let db = crate::db::connect_memory().await?;
        let team = maintenance_team::create(&db, "Mechanics", "Mechanical", None).await?;
        let eq = create(&db, NewEquipment {
            name: "CNC Mill".into(),
            serial_number: "CNC-001".into(),
            category: EquipmentCategory::Machinery,
            purchase_date: Utc::now().into(),
            warranty_expiry: None,
            location: "Hall A".into(),
            status: EquipmentStatus::Active,
            department_id: None,
            maintenance_team_id: team.id,
            owner_id: None,
        }).await?;
        assert_eq!(eq.category()?, EquipmentCategory::Machinery);
        assert!(!eq.is_scrapped());

        let scrapped = set_status(&db, eq.id, EquipmentStatus::Scrapped).await?;
        assert!(scrapped.is_scrapped());
        assert!(set_status(&db, Uuid::new_v4(), EquipmentStatus::Active).await.is_err());
        Ok(())
    }

    #[test]
    fn required_fields() {
        assert!(validate_required("name", "").is_err());
        assert!(validate_required("name", "Lathe").is_ok());
    }
}
