//! Maintenance requests: CRUD, visibility and the status workflow.
//!
//! ```text
//! NEW -> IN_PROGRESS -> {REPAIRED, SCRAP}
//! ```
//!
//! Entering `IN_PROGRESS` stamps `startedAt`; entering a terminal state stamps
//! `completedAt`. Scrapping also retires the equipment in the same transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{
    equipment, maintenance_request, maintenance_team, user, EquipmentStatus, Priority, RequestStatus, RequestType,
};

use crate::access::{self, Actor, RequestScope};
use crate::errors::ServiceError;
use crate::views::{EquipmentRef, TeamRef, UserSummary};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub priority: Option<Priority>,
    pub equipment_id: Uuid,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// Editable fields; the status only moves through the workflow operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    /// `null` clears the schedule.
    #[serde(default, deserialize_with = "crate::serde_ext::nullable")]
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    pub duration_hours: Option<f64>,
    pub completion_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub request_type: Option<RequestType>,
    pub equipment_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub assigned_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub duration_hours: Option<f64>,
    pub completion_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapRequest {
    pub completion_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub technician_id: Uuid,
}

/// A request with the records it points at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    #[serde(flatten)]
    pub request: maintenance_request::Model,
    pub equipment: Option<EquipmentRef>,
    pub team: Option<TeamRef>,
    pub assigned_to: Option<UserSummary>,
    pub created_by: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    #[serde(flatten)]
    pub view: RequestView,
    pub team_members: Vec<UserSummary>,
}

pub(crate) async fn hydrate<C: ConnectionTrait>(
    db: &C,
    items: Vec<maintenance_request::Model>,
) -> Result<Vec<RequestView>, ServiceError> {
    let equipment_ids: Vec<Uuid> = items.iter().map(|r| r.equipment_id).collect();
    let team_ids: Vec<Uuid> = items.iter().map(|r| r.team_id).collect();
    let user_ids: Vec<Uuid> = items
        .iter()
        .flat_map(|r| r.assigned_to_id.into_iter().chain(std::iter::once(r.created_by_id)))
        .collect();

    let equipment: HashMap<Uuid, equipment::Model> = equipment::Entity::find()
        .filter(equipment::Column::Id.is_in(equipment_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
    let teams: HashMap<Uuid, maintenance_team::Model> = maintenance_team::Entity::find()
        .filter(maintenance_team::Column::Id.is_in(team_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();
    let users: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(items
        .into_iter()
        .map(|r| RequestView {
            equipment: equipment.get(&r.equipment_id).cloned().map(EquipmentRef::from),
            team: teams.get(&r.team_id).cloned().map(TeamRef::from),
            assigned_to: r.assigned_to_id.and_then(|id| users.get(&id).cloned()).map(UserSummary::from),
            created_by: users.get(&r.created_by_id).cloned().map(UserSummary::from),
            request: r,
        })
        .collect())
}

async fn view_of<C: ConnectionTrait>(db: &C, request: maintenance_request::Model) -> Result<RequestView, ServiceError> {
    hydrate(db, vec![request])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("maintenance request"))
}

pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<maintenance_request::Model, ServiceError> {
    maintenance_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("maintenance request"))
}

/// Raise a request. Category and team are copied from the equipment.
pub async fn create(db: &DatabaseConnection, actor: &Actor, input: CreateRequest) -> Result<RequestView, ServiceError> {
    let eq = equipment::Entity::find_by_id(input.equipment_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("equipment"))?;
    if eq.is_scrapped() {
        return Err(ServiceError::Validation("cannot create a request for scrapped equipment".into()));
    }
    let created = maintenance_request::create(db, maintenance_request::NewRequest {
        subject: input.subject,
        description: input.description,
        request_type: input.request_type,
        priority: input.priority.unwrap_or_default(),
        category: eq.category.clone(),
        equipment_id: eq.id,
        team_id: eq.maintenance_team_id,
        created_by_id: actor.id,
        scheduled_date: input.scheduled_date.map(Into::into),
    })
    .await?;
    info!(request_id = %created.id, equipment_id = %eq.id, team_id = %created.team_id, created_by = %actor.id, "request_created");
    view_of(db, created).await
}

/// Requests visible to the caller, newest first.
pub async fn list(db: &DatabaseConnection, actor: &Actor, filter: RequestFilter) -> Result<Vec<RequestView>, ServiceError> {
    use maintenance_request::Column;
    let scope = RequestScope::for_actor(actor);
    let mut query = scope.apply(maintenance_request::Entity::find());
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status.as_str()));
    }
    if let Some(kind) = filter.request_type {
        query = query.filter(Column::RequestType.eq(kind.as_str()));
    }
    if let Some(eq) = filter.equipment_id {
        query = query.filter(Column::EquipmentId.eq(eq));
    }
    if scope.allows_custom_filters() {
        if let Some(team) = filter.team_id {
            query = query.filter(Column::TeamId.eq(team));
        }
        if let Some(user) = filter.assigned_to_id {
            query = query.filter(Column::AssignedToId.eq(user));
        }
    }
    let items = query.order_by_desc(Column::CreatedAt).all(db).await?;
    hydrate(db, items).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<RequestDetail, ServiceError> {
    let request = find(db, id).await?;
    let team_members = user::Entity::find()
        .filter(user::Column::TeamId.eq(request.team_id))
        .order_by_asc(user::Column::FirstName)
        .all(db)
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();
    Ok(RequestDetail { view: view_of(db, request).await?, team_members })
}

pub async fn update(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: UpdateRequest) -> Result<RequestView, ServiceError> {
    let request = access::ensure_team_access(db, actor, id).await?;
    maintenance_request::validate_duration(input.duration_hours)?;
    let mut am: maintenance_request::ActiveModel = request.into();
    if let Some(subject) = input.subject {
        maintenance_request::validate_subject(&subject)?;
        am.subject = Set(subject.trim().to_string());
    }
    if let Some(description) = input.description { am.description = Set(Some(description)); }
    if let Some(priority) = input.priority { am.priority = Set(priority.as_str().to_string()); }
    if let Some(date) = input.scheduled_date { am.scheduled_date = Set(date.map(Into::into)); }
    if let Some(hours) = input.duration_hours { am.duration_hours = Set(Some(hours)); }
    if let Some(notes) = input.completion_notes { am.completion_notes = Set(Some(notes)); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(request_id = %updated.id, user_id = %actor.id, "request_updated");
    view_of(db, updated).await
}

pub async fn delete(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    access::ensure_team_access(db, actor, id).await?;
    maintenance_request::Entity::delete_by_id(id).exec(db).await?;
    info!(request_id = %id, user_id = %actor.id, "request_deleted");
    Ok(())
}

/// Hand the request to a technician from its own team.
pub async fn assign(db: &DatabaseConnection, actor: &Actor, id: Uuid, technician_id: Uuid) -> Result<RequestView, ServiceError> {
    let request = access::ensure_team_access(db, actor, id).await?;
    let technician = user::Entity::find_by_id(technician_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("technician"))?;
    if technician.team_id != Some(request.team_id) {
        return Err(ServiceError::Validation("technician is not a member of the request's team".into()));
    }
    let mut am: maintenance_request::ActiveModel = request.into();
    am.assigned_to_id = Set(Some(technician.id));
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(request_id = %updated.id, technician_id = %technician.id, user_id = %actor.id, "request_assigned");
    view_of(db, updated).await
}

/// Move `request` along one edge of the workflow and persist it.
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    request: maintenance_request::Model,
    next: RequestStatus,
    completion_notes: Option<String>,
) -> Result<maintenance_request::Model, ServiceError> {
    let current = request.status()?;
    if !current.can_transition_to(next) {
        return Err(ServiceError::InvalidTransition {
            from: current,
            to: next,
            allowed: current.allowed_transitions().to_vec(),
        });
    }
    let now = Utc::now();
    let mut am: maintenance_request::ActiveModel = request.into();
    am.status = Set(next.as_str().to_string());
    match next {
        RequestStatus::InProgress => am.started_at = Set(Some(now.into())),
        RequestStatus::Repaired | RequestStatus::Scrap => {
            am.completed_at = Set(Some(now.into()));
            if let Some(notes) = completion_notes {
                am.completion_notes = Set(Some(notes));
            }
        }
        RequestStatus::New => {}
    }
    am.updated_at = Set(now.into());
    let updated = am.update(db).await?;
    info!(request_id = %updated.id, from = %current, to = %next, "request_transitioned");
    Ok(updated)
}

pub async fn start(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<RequestView, ServiceError> {
    let request = access::ensure_team_access(db, actor, id).await?;
    let updated = transition(db, request, RequestStatus::InProgress, None).await?;
    view_of(db, updated).await
}

/// Mark the request repaired; the status and the logged duration commit together.
pub async fn complete(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: CompleteRequest) -> Result<RequestView, ServiceError> {
    maintenance_request::validate_duration(input.duration_hours)?;
    let txn = db.begin().await?;
    let request = access::ensure_team_access(&txn, actor, id).await?;
    let mut updated = transition(&txn, request, RequestStatus::Repaired, input.completion_notes).await?;
    if let Some(hours) = input.duration_hours {
        let mut am: maintenance_request::ActiveModel = updated.into();
        am.duration_hours = Set(Some(hours));
        updated = am.update(&txn).await?;
    }
    txn.commit().await?;
    view_of(db, updated).await
}

/// Scrap the request and retire its equipment; both writes commit together.
pub async fn scrap(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: ScrapRequest) -> Result<RequestView, ServiceError> {
    let txn = db.begin().await?;
    let request = access::ensure_team_access(&txn, actor, id).await?;
    let equipment_id = request.equipment_id;
    let updated = transition(&txn, request, RequestStatus::Scrap, input.completion_notes).await?;
    equipment::set_status(&txn, equipment_id, EquipmentStatus::Scrapped).await?;
    txn.commit().await?;
    info!(request_id = %id, equipment_id = %equipment_id, "equipment_scrapped");
    view_of(db, updated).await
}
