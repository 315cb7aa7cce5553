use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::{department, equipment};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartment {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<department::Model>, ServiceError> {
    Ok(department::Entity::find().order_by_asc(department::Column::Name).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<department::Model, ServiceError> {
    department::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("department"))
}

pub async fn create(db: &DatabaseConnection, input: CreateDepartment) -> Result<department::Model, ServiceError> {
    let created = department::create(db, &input.name, input.description, input.location)
        .await
        .map_err(|e| ServiceError::from(e).conflict_as("department name already exists"))?;
    info!(department_id = %created.id, name = %created.name, "department_created");
    Ok(created)
}

pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateDepartment) -> Result<department::Model, ServiceError> {
    let found = get(db, id).await?;
    let mut am: department::ActiveModel = found.into();
    if let Some(name) = input.name {
        department::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = input.description { am.description = Set(Some(description)); }
    if let Some(location) = input.location { am.location = Set(Some(location)); }
    am.updated_at = Set(Utc::now().into());
    let updated = am
        .update(db)
        .await
        .map_err(|e| ServiceError::from(e).conflict_as("department name already exists"))?;
    Ok(updated)
}

/// Equipment in the department is kept and left without a department.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    get(db, id).await?;
    let txn = db.begin().await?;
    equipment::Entity::update_many()
        .col_expr(equipment::Column::DepartmentId, Expr::value(Option::<Uuid>::None))
        .filter(equipment::Column::DepartmentId.eq(id))
        .exec(&txn)
        .await?;
    department::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(department_id = %id, "department_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_equipment, seed_team};

    fn input(name: &str) -> CreateDepartment {
        CreateDepartment { name: name.into(), description: None, location: Some("Building 1".into()) }
    }

    #[tokio::test]
    async fn crud_and_ordering() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create(&db, input("Production")).await?;
        let assembly = create(&db, input("Assembly")).await?;
        let names: Vec<_> = list(&db).await?.into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Assembly", "Production"]);

        let renamed = update(&db, assembly.id, UpdateDepartment { name: Some("Final Assembly".into()), ..Default::default() }).await?;
        assert_eq!(renamed.name, "Final Assembly");
        assert_eq!(renamed.location.as_deref(), Some("Building 1"));

        assert!(matches!(create(&db, input("Production")).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(create(&db, input("  ")).await, Err(ServiceError::Validation(_))));
        assert!(matches!(get(&db, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_detaches_equipment() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let dept = create(&db, input("Logistics")).await?;
        let team = seed_team(&db, "Movers").await?;
        let eq = seed_equipment(&db, team.id, "FORK-1", Some(dept.id)).await?;

        delete(&db, dept.id).await?;
        let reloaded = equipment::Entity::find_by_id(eq.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.department_id, None);
        assert!(matches!(delete(&db, dept.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
