use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{equipment, maintenance_request, maintenance_team, user};

use crate::errors::ServiceError;
use crate::views::{EquipmentRef, UserSummary};

const DUPLICATE_NAME: &str = "team name already exists";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub specialty: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMember {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: maintenance_team::Model,
    pub members: Vec<UserSummary>,
    pub equipment_count: u64,
    pub request_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: maintenance_team::Model,
    pub members: Vec<UserSummary>,
    pub equipment: Vec<EquipmentRef>,
    pub request_count: u64,
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_team::Model, ServiceError> {
    maintenance_team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("team"))
}

async fn members_of(db: &DatabaseConnection, id: Uuid) -> Result<Vec<UserSummary>, ServiceError> {
    Ok(user::Entity::find()
        .filter(user::Column::TeamId.eq(id))
        .order_by_asc(user::Column::FirstName)
        .all(db)
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect())
}

async fn request_count(db: &DatabaseConnection, id: Uuid) -> Result<u64, ServiceError> {
    Ok(maintenance_request::Entity::find()
        .filter(maintenance_request::Column::TeamId.eq(id))
        .count(db)
        .await?)
}

async fn equipment_count(db: &DatabaseConnection, id: Uuid) -> Result<u64, ServiceError> {
    Ok(equipment::Entity::find()
        .filter(equipment::Column::MaintenanceTeamId.eq(id))
        .count(db)
        .await?)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<TeamSummary>, ServiceError> {
    let teams = maintenance_team::Entity::find()
        .order_by_asc(maintenance_team::Column::Name)
        .all(db)
        .await?;
    let mut members: HashMap<Uuid, Vec<UserSummary>> = HashMap::new();
    for u in user::Entity::find()
        .filter(user::Column::TeamId.is_not_null())
        .order_by_asc(user::Column::FirstName)
        .all(db)
        .await?
    {
        if let Some(team_id) = u.team_id {
            members.entry(team_id).or_default().push(UserSummary::from(u));
        }
    }
    let mut out = Vec::with_capacity(teams.len());
    for team in teams {
        out.push(TeamSummary {
            members: members.remove(&team.id).unwrap_or_default(),
            equipment_count: equipment_count(db, team.id).await?,
            request_count: request_count(db, team.id).await?,
            team,
        });
    }
    Ok(out)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<TeamDetail, ServiceError> {
    let team = find(db, id).await?;
    let equipment = equipment::Entity::find()
        .filter(equipment::Column::MaintenanceTeamId.eq(id))
        .order_by_asc(equipment::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(EquipmentRef::from)
        .collect();
    Ok(TeamDetail {
        members: members_of(db, id).await?,
        equipment,
        request_count: request_count(db, id).await?,
        team,
    })
}

pub async fn create(db: &DatabaseConnection, input: CreateTeam) -> Result<TeamDetail, ServiceError> {
    let created = maintenance_team::create(db, &input.name, &input.specialty, input.description)
        .await
        .map_err(|e| ServiceError::from(e).conflict_as(DUPLICATE_NAME))?;
    info!(team_id = %created.id, name = %created.name, "team_created");
    get(db, created.id).await
}

pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateTeam) -> Result<TeamDetail, ServiceError> {
    let found = find(db, id).await?;
    let mut am: maintenance_team::ActiveModel = found.into();
    if let Some(name) = input.name {
        maintenance_team::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(specialty) = input.specialty {
        maintenance_team::validate_specialty(&specialty)?;
        am.specialty = Set(specialty.trim().to_string());
    }
    if let Some(description) = input.description { am.description = Set(Some(description)); }
    am.updated_at = Set(Utc::now().into());
    am.update(db)
        .await
        .map_err(|e| ServiceError::from(e).conflict_as(DUPLICATE_NAME))?;
    get(db, id).await
}

/// Teams that still own equipment or requests cannot be deleted; members are released.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    find(db, id).await?;
    if equipment_count(db, id).await? > 0 || request_count(db, id).await? > 0 {
        return Err(ServiceError::Conflict("team still has equipment or maintenance requests".into()));
    }
    let txn = db.begin().await?;
    user::Entity::update_many()
        .col_expr(user::Column::TeamId, Expr::value(Option::<Uuid>::None))
        .filter(user::Column::TeamId.eq(id))
        .exec(&txn)
        .await?;
    maintenance_team::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(team_id = %id, "team_deleted");
    Ok(())
}

pub async fn add_member(db: &DatabaseConnection, team_id: Uuid, user_id: Uuid) -> Result<TeamDetail, ServiceError> {
    find(db, team_id).await?;
    let member = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let mut am: user::ActiveModel = member.into();
    am.team_id = Set(Some(team_id));
    am.updated_at = Set(Utc::now().into());
    am.update(db).await?;
    info!(team_id = %team_id, user_id = %user_id, "team_member_added");
    get(db, team_id).await
}

pub async fn remove_member(db: &DatabaseConnection, team_id: Uuid, user_id: Uuid) -> Result<TeamDetail, ServiceError> {
    find(db, team_id).await?;
    let member = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    if member.team_id != Some(team_id) {
        return Err(ServiceError::Validation("user is not a member of this team".into()));
    }
    let mut am: user::ActiveModel = member.into();
    am.team_id = Set(None);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await?;
    info!(team_id = %team_id, user_id = %user_id, "team_member_removed");
    get(db, team_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Role;
    use crate::test_support::{get_db, seed_equipment, seed_user};

    fn input(name: &str) -> CreateTeam {
        CreateTeam { name: name.into(), specialty: "HVAC".into(), description: None }
    }

    #[tokio::test]
    async fn membership_round_trip() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let team = create(&db, input("Cooling")).await?;
        let tech = seed_user(&db, "t@example.com", Role::Technician, None).await?;

        let with_member = add_member(&db, team.team.id, tech.id).await?;
        assert_eq!(with_member.members.len(), 1);
        assert_eq!(with_member.members[0].role, "TECHNICIAN");

        let listed = list(&db).await?;
        assert_eq!(listed[0].members.len(), 1);

        let emptied = remove_member(&db, team.team.id, tech.id).await?;
        assert!(emptied.members.is_empty());
        let again = remove_member(&db, team.team.id, tech.id).await;
        assert!(matches!(again, Err(ServiceError::Validation(_))));

        assert!(matches!(add_member(&db, team.team.id, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(add_member(&db, Uuid::new_v4(), tech.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_refuses_teams_with_dependents() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let busy = create(&db, input("Busy")).await?;
        seed_equipment(&db, busy.team.id, "AC-1", None).await?;
        assert!(matches!(delete(&db, busy.team.id).await, Err(ServiceError::Conflict(_))));

        let idle = create(&db, input("Idle")).await?;
        let tech = seed_user(&db, "idle@example.com", Role::Technician, Some(idle.team.id)).await?;
        delete(&db, idle.team.id).await?;
        let reloaded = user::Entity::find_by_id(tech.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.team_id, None);

        let summary = list(&db).await?;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].equipment_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn names_are_unique() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        create(&db, input("Plumbers")).await?;
        let dup = create(&db, input("Plumbers")).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(m)) if m == DUPLICATE_NAME));
        let bad = create(&db, CreateTeam { name: "X".into(), specialty: " ".into(), description: None }).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
