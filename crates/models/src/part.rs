use sea_orm::{entity::prelude::*, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Spare-parts inventory line.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "part")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub cost: f64,
    pub location: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

#[derive(Debug, Clone)]
pub struct NewPart {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub cost: f64,
    pub location: Option<String>,
}

pub fn validate_stock(quantity: i32, min_quantity: i32, cost: f64) -> Result<(), ModelError> {
    if quantity < 0 { return Err(ModelError::validation("quantity must be >= 0")); }
    if min_quantity < 0 { return Err(ModelError::validation("minQuantity must be >= 0")); }
    if !cost.is_finite() || cost < 0.0 { return Err(ModelError::validation("cost must be >= 0")); }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewPart) -> Result<Model, ModelError> {
    if new.name.trim().is_empty() { return Err(ModelError::validation("part name required")); }
    if new.sku.trim().is_empty() { return Err(ModelError::validation("sku required")); }
    validate_stock(new.quantity, new.min_quantity, new.cost)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name.trim().to_string()),
        sku: Set(new.sku.trim().to_string()),
        description: Set(new.description),
        quantity: Set(new.quantity),
        min_quantity: Set(new.min_quantity),
        cost: Set(new.cost),
        location: Set(new.location),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_bounds() {
        assert!(validate_stock(0, 0, 0.0).is_ok());
        assert!(validate_stock(-1, 0, 1.0).is_err());
        assert!(validate_stock(1, -1, 1.0).is_err());
        assert!(validate_stock(1, 1, -0.5).is_err());
        assert!(validate_stock(1, 1, f64::NAN).is_err());
    }

    #[test]
    fn low_stock_includes_threshold() {
        let now = Utc::now().into();
        let p = Model {
            id: Uuid::new_v4(),
            name: "Belt".into(),
            sku: "B-1".into(),
            description: None,
            quantity: 3,
            min_quantity: 3,
            cost: 9.5,
            location: None,
            created_at: now,
            updated_at: now,
        };
        assert!(p.is_low_stock());
        assert!(!Model { quantity: 4, ..p }.is_low_stock());
    }
}
