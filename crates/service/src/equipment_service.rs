use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{department, equipment, maintenance_request, maintenance_team, user, EquipmentCategory, EquipmentStatus, RequestStatus};

use crate::errors::ServiceError;
use crate::request_service::{self, RequestView};
use crate::views::{DepartmentRef, TeamRef, UserSummary};

const DUPLICATE_SERIAL: &str = "equipment with this serial number already exists";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipment {
    pub name: String,
    pub serial_number: String,
    pub category: EquipmentCategory,
    pub purchase_date: DateTime<Utc>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub location: String,
    pub status: Option<EquipmentStatus>,
    pub department_id: Option<Uuid>,
    pub maintenance_team_id: Uuid,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub category: Option<EquipmentCategory>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: Option<EquipmentStatus>,
    /// `null` detaches the equipment from its department.
    #[serde(default, deserialize_with = "crate::serde_ext::nullable")]
    pub department_id: Option<Option<Uuid>>,
    pub maintenance_team_id: Option<Uuid>,
    /// `null` clears the owner.
    #[serde(default, deserialize_with = "crate::serde_ext::nullable")]
    pub owner_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentFilter {
    pub department_id: Option<Uuid>,
    pub status: Option<EquipmentStatus>,
    pub category: Option<EquipmentCategory>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentView {
    #[serde(flatten)]
    pub equipment: equipment::Model,
    pub department: Option<DepartmentRef>,
    pub maintenance_team: Option<TeamRef>,
    pub owner: Option<UserSummary>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OpenRequestCount {
    pub count: u64,
}

async fn hydrate<C: ConnectionTrait>(db: &C, items: Vec<equipment::Model>) -> Result<Vec<EquipmentView>, ServiceError> {
    let dept_ids: Vec<Uuid> = items.iter().filter_map(|e| e.department_id).collect();
    let team_ids: Vec<Uuid> = items.iter().map(|e| e.maintenance_team_id).collect();
    let owner_ids: Vec<Uuid> = items.iter().filter_map(|e| e.owner_id).collect();

    let depts: HashMap<Uuid, department::Model> = department::Entity::find()
        .filter(department::Column::Id.is_in(dept_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    let teams: HashMap<Uuid, maintenance_team::Model> = maintenance_team::Entity::find()
        .filter(maintenance_team::Column::Id.is_in(team_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();
    let owners: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(owner_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(items
        .into_iter()
        .map(|e| EquipmentView {
            department: e.department_id.and_then(|id| depts.get(&id).cloned()).map(DepartmentRef::from),
            maintenance_team: teams.get(&e.maintenance_team_id).cloned().map(TeamRef::from),
            owner: e.owner_id.and_then(|id| owners.get(&id).cloned()).map(UserSummary::from),
            equipment: e,
        })
        .collect())
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<equipment::Model, ServiceError> {
    equipment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("equipment"))
}

pub async fn list(db: &DatabaseConnection, filter: EquipmentFilter) -> Result<Vec<EquipmentView>, ServiceError> {
    let mut query = equipment::Entity::find();
    if let Some(dept) = filter.department_id {
        query = query.filter(equipment::Column::DepartmentId.eq(dept));
    }
    if let Some(status) = filter.status {
        query = query.filter(equipment::Column::Status.eq(status.as_str()));
    }
    if let Some(category) = filter.category {
        query = query.filter(equipment::Column::Category.eq(category.as_str()));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        let lower = |col: equipment::Column| Expr::expr(Func::lower(Expr::col((equipment::Entity, col))));
        query = query.filter(
            Condition::any()
                .add(lower(equipment::Column::Name).like(pattern.as_str()))
                .add(lower(equipment::Column::SerialNumber).like(pattern.as_str()))
                .add(lower(equipment::Column::Location).like(pattern.as_str())),
        );
    }
    let items = query.order_by_asc(equipment::Column::Name).all(db).await?;
    hydrate(db, items).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<EquipmentView, ServiceError> {
    let found = find(db, id).await?;
    let mut views = hydrate(db, vec![found]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("equipment"))
}

async fn check_references(
    db: &DatabaseConnection,
    team_id: Option<Uuid>,
    department_id: Option<Uuid>,
    owner_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    if let Some(team_id) = team_id {
        if maintenance_team::Entity::find_by_id(team_id).one(db).await?.is_none() {
            return Err(ServiceError::Validation("maintenance team does not exist".into()));
        }
    }
    if let Some(dept) = department_id {
        if department::Entity::find_by_id(dept).one(db).await?.is_none() {
            return Err(ServiceError::Validation("department does not exist".into()));
        }
    }
    if let Some(owner) = owner_id {
        if user::Entity::find_by_id(owner).one(db).await?.is_none() {
            return Err(ServiceError::Validation("owner does not exist".into()));
        }
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: CreateEquipment) -> Result<EquipmentView, ServiceError> {
    check_references(db, Some(input.maintenance_team_id), input.department_id, input.owner_id).await?;
    let created = equipment::create(db, equipment::NewEquipment {
        name: input.name,
        serial_number: input.serial_number,
        category: input.category,
        purchase_date: input.purchase_date.into(),
        warranty_expiry: input.warranty_expiry.map(Into::into),
        location: input.location,
        status: input.status.unwrap_or(EquipmentStatus::Active),
        department_id: input.department_id,
        maintenance_team_id: input.maintenance_team_id,
        owner_id: input.owner_id,
    })
    .await
    .map_err(|e| ServiceError::from(e).conflict_as(DUPLICATE_SERIAL))?;
    info!(equipment_id = %created.id, serial = %created.serial_number, "equipment_created");
    get(db, created.id).await
}

pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateEquipment) -> Result<EquipmentView, ServiceError> {
    let found = find(db, id).await?;
    check_references(db, input.maintenance_team_id, input.department_id.flatten(), input.owner_id.flatten()).await?;
    let mut am: equipment::ActiveModel = found.into();
    if let Some(name) = input.name {
        equipment::validate_required("name", &name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(serial) = input.serial_number {
        equipment::validate_required("serialNumber", &serial)?;
        am.serial_number = Set(serial.trim().to_string());
    }
    if let Some(location) = input.location {
        equipment::validate_required("location", &location)?;
        am.location = Set(location.trim().to_string());
    }
    if let Some(category) = input.category { am.category = Set(category.as_str().to_string()); }
    if let Some(status) = input.status { am.status = Set(status.as_str().to_string()); }
    if let Some(date) = input.purchase_date { am.purchase_date = Set(date.into()); }
    if let Some(date) = input.warranty_expiry { am.warranty_expiry = Set(Some(date.into())); }
    if let Some(dept) = input.department_id { am.department_id = Set(dept); }
    if let Some(team) = input.maintenance_team_id { am.maintenance_team_id = Set(team); }
    if let Some(owner) = input.owner_id { am.owner_id = Set(owner); }
    am.updated_at = Set(Utc::now().into());
    let updated = am
        .update(db)
        .await
        .map_err(|e| ServiceError::from(e).conflict_as(DUPLICATE_SERIAL))?;
    info!(equipment_id = %updated.id, "equipment_updated");
    get(db, updated.id).await
}

/// Removes the equipment together with its maintenance requests.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    find(db, id).await?;
    let txn = db.begin().await?;
    maintenance_request::Entity::delete_many()
        .filter(maintenance_request::Column::EquipmentId.eq(id))
        .exec(&txn)
        .await?;
    equipment::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(equipment_id = %id, "equipment_deleted");
    Ok(())
}

/// Every request raised against the equipment, newest first.
pub async fn requests(db: &DatabaseConnection, id: Uuid) -> Result<Vec<RequestView>, ServiceError> {
    find(db, id).await?;
    let items = maintenance_request::Entity::find()
        .filter(maintenance_request::Column::EquipmentId.eq(id))
        .order_by_desc(maintenance_request::Column::CreatedAt)
        .all(db)
        .await?;
    request_service::hydrate(db, items).await
}

pub async fn open_request_count(db: &DatabaseConnection, id: Uuid) -> Result<OpenRequestCount, ServiceError> {
    find(db, id).await?;
    let open: Vec<&str> = RequestStatus::open().iter().map(|s| s.as_str()).collect();
    let count = maintenance_request::Entity::find()
        .filter(maintenance_request::Column::EquipmentId.eq(id))
        .filter(maintenance_request::Column::Status.is_in(open))
        .count(db)
        .await?;
    Ok(OpenRequestCount { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Role;
    use crate::department_service::{self, CreateDepartment};
    use crate::test_support::{get_db, seed_team, seed_user};

    fn input(serial: &str, name: &str, team_id: Uuid) -> CreateEquipment {
        CreateEquipment {
            name: name.into(),
            serial_number: serial.into(),
            category: EquipmentCategory::Computer,
            purchase_date: Utc::now(),
            warranty_expiry: None,
            location: "Office 2".into(),
            status: None,
            department_id: None,
            maintenance_team_id: team_id,
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn create_checks_references_and_duplicates() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let team = seed_team(&db, "IT").await?;

        let view = create(&db, input("PC-1", "Workstation", team.id)).await?;
        assert_eq!(view.equipment.status, "ACTIVE");
        assert_eq!(view.maintenance_team.as_ref().map(|t| t.name.as_str()), Some("IT"));

        let dup = create(&db, input("PC-1", "Other", team.id)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(m)) if m == DUPLICATE_SERIAL));

        let bad_team = create(&db, input("PC-2", "Orphan", Uuid::new_v4())).await;
        assert!(matches!(bad_team, Err(ServiceError::Validation(_))));

        let mut bad_dept = input("PC-3", "Lost", team.id);
        bad_dept.department_id = Some(Uuid::new_v4());
        assert!(matches!(create(&db, bad_dept).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_search() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let team = seed_team(&db, "IT").await?;
        create(&db, input("LAP-77", "Laptop", team.id)).await?;
        let mut printer = input("PRN-01", "Printer", team.id);
        printer.category = EquipmentCategory::Electrical;
        printer.status = Some(EquipmentStatus::Inactive);
        create(&db, printer).await?;

        let all = list(&db, EquipmentFilter::default()).await?;
        assert_eq!(all.iter().map(|v| v.equipment.name.as_str()).collect::<Vec<_>>(), vec!["Laptop", "Printer"]);

        let search = list(&db, EquipmentFilter { search: Some("lap".into()), ..Default::default() }).await?;
        assert_eq!(search.len(), 1);
        let by_serial = list(&db, EquipmentFilter { search: Some("prn".into()), ..Default::default() }).await?;
        assert_eq!(by_serial[0].equipment.name, "Printer");

        let inactive = list(&db, EquipmentFilter { status: Some(EquipmentStatus::Inactive), ..Default::default() }).await?;
        assert_eq!(inactive.len(), 1);
        let computers = list(&db, EquipmentFilter { category: Some(EquipmentCategory::Computer), ..Default::default() }).await?;
        assert_eq!(computers[0].equipment.serial_number, "LAP-77");
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let team = seed_team(&db, "IT").await?;
        let view = create(&db, input("SRV-1", "Server", team.id)).await?;
        let updated = update(&db, view.equipment.id, UpdateEquipment { location: Some("Rack 4".into()), ..Default::default() }).await?;
        assert_eq!(updated.equipment.location, "Rack 4");
        assert_eq!(open_request_count(&db, view.equipment.id).await?.count, 0);

        delete(&db, view.equipment.id).await?;
        assert!(matches!(get(&db, view.equipment.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(requests(&db, view.equipment.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_sets_and_clears_optional_links() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let team = seed_team(&db, "IT").await?;
        let dept = department_service::create(&db, CreateDepartment { name: "Finance".into(), description: None, location: None }).await?;
        let owner = seed_user(&db, "owner@example.com", Role::User, None).await?;
        let id = create(&db, input("NB-9", "Notebook", team.id)).await?.equipment.id;

        let linked = update(&db, id, UpdateEquipment {
            department_id: Some(Some(dept.id)),
            owner_id: Some(Some(owner.id)),
            ..Default::default()
        })
        .await?;
        assert_eq!(linked.equipment.department_id, Some(dept.id));
        assert_eq!(linked.owner.map(|u| u.id), Some(owner.id));

        // absent fields leave the links alone
        let renamed = update(&db, id, serde_json::from_str(r#"{"name":"Notebook Pro"}"#)?).await?;
        assert_eq!(renamed.equipment.department_id, Some(dept.id));
        assert_eq!(renamed.equipment.owner_id, Some(owner.id));

        let cleared = update(&db, id, serde_json::from_str(r#"{"departmentId":null,"ownerId":null}"#)?).await?;
        assert_eq!(cleared.equipment.department_id, None);
        assert_eq!(cleared.equipment.owner_id, None);
        assert!(cleared.department.is_none());

        let dangling = update(&db, id, UpdateEquipment { owner_id: Some(Some(Uuid::new_v4())), ..Default::default() }).await;
        assert!(matches!(dangling, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
