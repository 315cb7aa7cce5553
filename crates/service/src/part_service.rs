use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::part;

use crate::errors::ServiceError;

const DUPLICATE_SKU: &str = "part with this sku already exists";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePart {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_quantity: i32,
    #[serde(default)]
    pub cost: f64,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePart {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub cost: Option<f64>,
    pub location: Option<String>,
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<part::Model>, ServiceError> {
    Ok(part::Entity::find().order_by_asc(part::Column::Name).all(db).await?)
}

/// Parts at or below their reorder threshold.
pub async fn low_stock(db: &DatabaseConnection) -> Result<Vec<part::Model>, ServiceError> {
    Ok(part::Entity::find()
        .filter(Expr::col(part::Column::Quantity).lte(Expr::col(part::Column::MinQuantity)))
        .order_by_asc(part::Column::Quantity)
        .order_by_asc(part::Column::Name)
        .all(db)
        .await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<part::Model, ServiceError> {
    part::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("part"))
}

pub async fn create(db: &DatabaseConnection, input: CreatePart) -> Result<part::Model, ServiceError> {
    let created = part::create(db, part::NewPart {
        name: input.name,
        sku: input.sku,
        description: input.description,
        quantity: input.quantity,
        min_quantity: input.min_quantity,
        cost: input.cost,
        location: input.location,
    })
    .await
    .map_err(|e| ServiceError::from(e).conflict_as(DUPLICATE_SKU))?;
    info!(part_id = %created.id, sku = %created.sku, "part_created");
    Ok(created)
}

pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdatePart) -> Result<part::Model, ServiceError> {
    let found = get(db, id).await?;
    part::validate_stock(
        input.quantity.unwrap_or(found.quantity),
        input.min_quantity.unwrap_or(found.min_quantity),
        input.cost.unwrap_or(found.cost),
    )?;
    let mut am: part::ActiveModel = found.into();
    if let Some(name) = input.name {
        if name.trim().is_empty() { return Err(ServiceError::Validation("part name required".into())); }
        am.name = Set(name.trim().to_string());
    }
    if let Some(sku) = input.sku {
        if sku.trim().is_empty() { return Err(ServiceError::Validation("sku required".into())); }
        am.sku = Set(sku.trim().to_string());
    }
    if let Some(description) = input.description { am.description = Set(Some(description)); }
    if let Some(q) = input.quantity { am.quantity = Set(q); }
    if let Some(q) = input.min_quantity { am.min_quantity = Set(q); }
    if let Some(c) = input.cost { am.cost = Set(c); }
    if let Some(location) = input.location { am.location = Set(Some(location)); }
    am.updated_at = Set(Utc::now().into());
    let updated = am
        .update(db)
        .await
        .map_err(|e| ServiceError::from(e).conflict_as(DUPLICATE_SKU))?;
    Ok(updated)
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    get(db, id).await?;
    part::Entity::delete_by_id(id).exec(db).await?;
    info!(part_id = %id, "part_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn input(sku: &str, quantity: i32, min_quantity: i32) -> CreatePart {
        CreatePart {
            name: format!("Part {sku}"),
            sku: sku.into(),
            description: None,
            quantity,
            min_quantity,
            cost: 4.25,
            location: None,
        }
    }

    #[tokio::test]
    async fn low_stock_uses_threshold() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create(&db, input("FILTER", 10, 2)).await?;
        create(&db, input("BELT", 2, 2)).await?;
        create(&db, input("FUSE", 0, 5)).await?;
        let low: Vec<_> = low_stock(&db).await?.into_iter().map(|p| p.sku).collect();
        assert_eq!(low, vec!["FUSE", "BELT"]);
        Ok(())
    }

    #[tokio::test]
    async fn validation_and_conflicts() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = create(&db, input("GASKET", 3, 1)).await?;
        assert!(matches!(create(&db, input("GASKET", 1, 1)).await, Err(ServiceError::Conflict(m)) if m == DUPLICATE_SKU));
        assert!(matches!(create(&db, input("NEG", -1, 0)).await, Err(ServiceError::Validation(_))));

        let bad = update(&db, p.id, UpdatePart { cost: Some(-1.0), ..Default::default() }).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));
        let ok = update(&db, p.id, UpdatePart { quantity: Some(0), ..Default::default() }).await?;
        assert_eq!(ok.quantity, 0);

        delete(&db, p.id).await?;
        assert!(matches!(get(&db, p.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
