use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Extension, Json, Router};
use uuid::Uuid;

use models::Role;
use service::reports::{self, CalendarQuery, KanbanColumn, PivotReport};
use service::request_service::{
    self, AssignRequest, CompleteRequest, CreateRequest, RequestDetail, RequestFilter, RequestView, ScrapRequest,
    UpdateRequest,
};

use crate::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, OptionalJson};
use crate::routes::authorize;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/kanban", get(kanban))
        .route("/calendar", get(calendar))
        .route("/overdue", get(overdue))
        .route("/reports/pivot", get(pivot))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/assign", post(assign))
        .route("/:id/start", post(start))
        .route("/:id/complete", post(complete))
        .route("/:id/scrap", post(scrap))
}

#[utoipa::path(post, path = "/api/requests", tag = "requests", security(("bearer" = [])),
    request_body = crate::openapi::RequestInput,
    responses((status = 201, description = "Created"), (status = 400, description = "Equipment is scrapped"), (status = 404, description = "Unknown equipment")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateRequest>,
) -> Result<(StatusCode, Json<RequestView>), JsonApiError> {
    let created = request_service::create(&state.db, &current.actor(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/requests", tag = "requests", security(("bearer" = [])),
    params(
        ("status" = Option<String>, Query, description = "NEW, IN_PROGRESS, REPAIRED or SCRAP"),
        ("requestType" = Option<String>, Query, description = "CORRECTIVE or PREVENTIVE"),
        ("equipmentId" = Option<Uuid>, Query, description = "Only requests for this equipment"),
        ("teamId" = Option<Uuid>, Query, description = "Only requests of this team"),
        ("assignedToId" = Option<Uuid>, Query, description = "Only requests assigned to this user"),
    ),
    responses((status = 200, description = "Requests visible to the caller, newest first")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<Vec<RequestView>>, JsonApiError> {
    Ok(Json(request_service::list(&state.db, &current.actor(), filter).await?))
}

#[utoipa::path(get, path = "/api/requests/kanban", tag = "requests", security(("bearer" = [])),
    responses((status = 200, description = "One column per status")))]
pub async fn kanban(State(state): State<ServerState>) -> Result<Json<Vec<KanbanColumn>>, JsonApiError> {
    Ok(Json(reports::kanban(&state.db).await?))
}

#[utoipa::path(get, path = "/api/requests/calendar", tag = "requests", security(("bearer" = [])),
    params(
        ("startDate" = String, Query, description = "RFC 3339 timestamp or YYYY-MM-DD"),
        ("endDate" = String, Query, description = "RFC 3339 timestamp or YYYY-MM-DD, inclusive"),
    ),
    responses((status = 200, description = "Preventive requests scheduled in the window"), (status = 400, description = "Missing or malformed dates")))]
pub async fn calendar(
    State(state): State<ServerState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<RequestView>>, JsonApiError> {
    Ok(Json(reports::calendar(&state.db, query).await?))
}

#[utoipa::path(get, path = "/api/requests/overdue", tag = "requests", security(("bearer" = [])),
    responses((status = 200, description = "Open requests whose scheduled date has passed")))]
pub async fn overdue(State(state): State<ServerState>) -> Result<Json<Vec<RequestView>>, JsonApiError> {
    Ok(Json(reports::overdue(&state.db).await?))
}

#[utoipa::path(get, path = "/api/requests/reports/pivot", tag = "requests", security(("bearer" = [])),
    responses((status = 200, description = "Request counts by team, category, status and type")))]
pub async fn pivot(State(state): State<ServerState>) -> Result<Json<PivotReport>, JsonApiError> {
    Ok(Json(reports::pivot(&state.db).await?))
}

#[utoipa::path(get, path = "/api/requests/{id}", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    responses((status = 200, description = "Request with team members"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<RequestDetail>, JsonApiError> {
    Ok(Json(request_service::get(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/requests/{id}", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")), request_body = crate::openapi::RequestUpdateInput,
    responses((status = 200, description = "Updated"), (status = 403, description = "Not on the request's team"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdateRequest>,
) -> Result<Json<RequestView>, JsonApiError> {
    Ok(Json(request_service::update(&state.db, &current.actor(), id, input).await?))
}

#[utoipa::path(delete, path = "/api/requests/{id}", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Not on the request's team"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    request_service::delete(&state.db, &current.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/requests/{id}/assign", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")), request_body = crate::openapi::AssignInput,
    responses((status = 200, description = "Assigned"), (status = 400, description = "Technician not on the team"), (status = 403, description = "Forbidden")))]
pub async fn assign(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<AssignRequest>,
) -> Result<Json<RequestView>, JsonApiError> {
    let actor = authorize(&current, &[Role::Admin, Role::Manager])?;
    Ok(Json(request_service::assign(&state.db, &actor, id, input.technician_id).await?))
}

#[utoipa::path(post, path = "/api/requests/{id}/start", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    responses((status = 200, description = "Now IN_PROGRESS"), (status = 400, description = "Invalid Status Transition"), (status = 403, description = "Not on the request's team")))]
pub async fn start(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestView>, JsonApiError> {
    Ok(Json(request_service::start(&state.db, &current.actor(), id).await?))
}

#[utoipa::path(post, path = "/api/requests/{id}/complete", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")), request_body = crate::openapi::CompleteInput,
    responses((status = 200, description = "Now REPAIRED"), (status = 400, description = "Invalid Status Transition"), (status = 403, description = "Not on the request's team")))]
pub async fn complete(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    OptionalJson(input): OptionalJson<CompleteRequest>,
) -> Result<Json<RequestView>, JsonApiError> {
    Ok(Json(request_service::complete(&state.db, &current.actor(), id, input).await?))
}

#[utoipa::path(post, path = "/api/requests/{id}/scrap", tag = "requests", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Request id")), request_body = crate::openapi::ScrapInput,
    responses((status = 200, description = "Now SCRAP; equipment retired"), (status = 400, description = "Invalid Status Transition"), (status = 403, description = "Not on the request's team")))]
pub async fn scrap(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    OptionalJson(input): OptionalJson<ScrapRequest>,
) -> Result<Json<RequestView>, JsonApiError> {
    Ok(Json(request_service::scrap(&state.db, &current.actor(), id, input).await?))
}
