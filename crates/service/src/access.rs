//! Role checks, team access and request visibility.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Select};
use tracing::warn;
use uuid::Uuid;

use models::{maintenance_request, Role};

use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;

/// The authenticated caller as seen by the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

impl From<&AuthUser> for Actor {
    fn from(u: &AuthUser) -> Self {
        Self { id: u.id, role: u.role, team_id: u.team_id }
    }
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), ServiceError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    warn!(user_id = %actor.id, role = %actor.role, "role not permitted");
    Err(ServiceError::forbidden(format!("role {} may not perform this action", actor.role)))
}

/// Which maintenance requests a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    All,
    Team(Uuid),
    AssignedTo(Uuid),
    CreatedBy(Uuid),
}

impl RequestScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Admin | Role::Manager => RequestScope::All,
            Role::Technician => match actor.team_id {
                Some(team) => RequestScope::Team(team),
                None => RequestScope::AssignedTo(actor.id),
            },
            Role::User => RequestScope::CreatedBy(actor.id),
        }
    }

    /// Only unrestricted callers may narrow by team or assignee themselves.
    pub fn allows_custom_filters(&self) -> bool {
        matches!(self, RequestScope::All)
    }

    pub fn apply(&self, query: Select<maintenance_request::Entity>) -> Select<maintenance_request::Entity> {
        use maintenance_request::Column;
        match *self {
            RequestScope::All => query,
            RequestScope::Team(team) => query.filter(Column::TeamId.eq(team)),
            RequestScope::AssignedTo(user) => query.filter(Column::AssignedToId.eq(user)),
            RequestScope::CreatedBy(user) => query.filter(Column::CreatedById.eq(user)),
        }
    }
}

/// Load a request the caller is allowed to mutate: admins always, others only within their team.
pub async fn ensure_team_access<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    request_id: Uuid,
) -> Result<maintenance_request::Model, ServiceError> {
    let request = maintenance_request::Entity::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("maintenance request"))?;
    if actor.is_admin() || actor.team_id == Some(request.team_id) {
        return Ok(request);
    }
    warn!(user_id = %actor.id, request_id = %request_id, "team access denied");
    Err(ServiceError::forbidden("you are not a member of this request's team"))
}
