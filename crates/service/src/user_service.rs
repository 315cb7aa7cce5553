use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use uuid::Uuid;

use models::{maintenance_team, user};

use crate::errors::ServiceError;
use crate::views::TeamRef;

/// The caller's own account as returned by `/auth/me`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: user::Model,
    pub team: Option<TeamRef>,
}

pub async fn profile(db: &DatabaseConnection, id: Uuid) -> Result<UserProfile, ServiceError> {
    let found = user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let team = match found.team_id {
        Some(team_id) => maintenance_team::Entity::find_by_id(team_id).one(db).await?.map(TeamRef::from),
        None => None,
    };
    Ok(UserProfile { user: found, team })
}
