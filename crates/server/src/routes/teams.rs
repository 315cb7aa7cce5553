use axum::{extract::{Path, State}, http::StatusCode, routing::{delete, get, post}, Extension, Json, Router};
use uuid::Uuid;

use models::Role;
use service::team_service::{self, AddMember, CreateTeam, TeamDetail, TeamSummary, UpdateTeam};

use crate::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::authorize;

const TEAM_EDITORS: &[Role] = &[Role::Admin, Role::Manager];

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/members", post(add_member))
        .route("/:id/members/:user_id", delete(remove_member))
}

#[utoipa::path(get, path = "/api/teams", tag = "teams", security(("bearer" = [])),
    responses((status = 200, description = "Teams with members and counts")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<TeamSummary>>, JsonApiError> {
    Ok(Json(team_service::list(&state.db).await?))
}

#[utoipa::path(get, path = "/api/teams/{id}", tag = "teams", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Team id")),
    responses((status = 200, description = "Team with members and equipment"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<TeamDetail>, JsonApiError> {
    Ok(Json(team_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/teams", tag = "teams", security(("bearer" = [])),
    request_body = crate::openapi::TeamInput,
    responses((status = 201, description = "Created"), (status = 403, description = "Admin or manager only"), (status = 409, description = "Duplicate name")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateTeam>,
) -> Result<(StatusCode, Json<TeamDetail>), JsonApiError> {
    authorize(&current, TEAM_EDITORS)?;
    Ok((StatusCode::CREATED, Json(team_service::create(&state.db, input).await?)))
}

#[utoipa::path(put, path = "/api/teams/{id}", tag = "teams", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Team id")), request_body = crate::openapi::TeamInput,
    responses((status = 200, description = "Updated"), (status = 403, description = "Admin or manager only"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdateTeam>,
) -> Result<Json<TeamDetail>, JsonApiError> {
    authorize(&current, TEAM_EDITORS)?;
    Ok(Json(team_service::update(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/api/teams/{id}", tag = "teams", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Team id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin only"), (status = 409, description = "Team still owns equipment or requests")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    team_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/teams/{id}/members", tag = "teams", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Team id")), request_body = crate::openapi::AddMemberInput,
    responses((status = 200, description = "Member added"), (status = 403, description = "Admin or manager only"), (status = 404, description = "Not Found")))]
pub async fn add_member(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<AddMember>,
) -> Result<Json<TeamDetail>, JsonApiError> {
    authorize(&current, TEAM_EDITORS)?;
    Ok(Json(team_service::add_member(&state.db, id, input.user_id).await?))
}

#[utoipa::path(delete, path = "/api/teams/{id}/members/{user_id}", tag = "teams", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Team id"), ("user_id" = Uuid, Path, description = "Member id")),
    responses((status = 200, description = "Member removed"), (status = 400, description = "Not a member"), (status = 403, description = "Admin or manager only")))]
pub async fn remove_member(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TeamDetail>, JsonApiError> {
    authorize(&current, TEAM_EDITORS)?;
    Ok(Json(team_service::remove_member(&state.db, id, user_id).await?))
}
