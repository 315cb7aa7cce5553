use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Extension, Json, Router};
use uuid::Uuid;

use models::Role;
use service::equipment_service::{self, CreateEquipment, EquipmentFilter, EquipmentView, OpenRequestCount, UpdateEquipment};
use service::request_service::RequestView;

use crate::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::authorize;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/requests", get(requests))
        .route("/:id/requests/count", get(requests_count))
}

#[utoipa::path(get, path = "/api/equipment", tag = "equipment", security(("bearer" = [])),
    params(
        ("departmentId" = Option<Uuid>, Query, description = "Only equipment of this department"),
        ("status" = Option<String>, Query, description = "ACTIVE, INACTIVE or SCRAPPED"),
        ("category" = Option<String>, Query, description = "Equipment category"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on name, serial number or location"),
    ),
    responses((status = 200, description = "Equipment ordered by name")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<EquipmentFilter>,
) -> Result<Json<Vec<EquipmentView>>, JsonApiError> {
    Ok(Json(equipment_service::list(&state.db, filter).await?))
}

#[utoipa::path(get, path = "/api/equipment/{id}", tag = "equipment", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Equipment id")),
    responses((status = 200, description = "Equipment"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<EquipmentView>, JsonApiError> {
    Ok(Json(equipment_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/equipment", tag = "equipment", security(("bearer" = [])),
    request_body = crate::openapi::EquipmentInput,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad reference"), (status = 403, description = "Admin only"), (status = 409, description = "Duplicate serial number")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateEquipment>,
) -> Result<(StatusCode, Json<EquipmentView>), JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    Ok((StatusCode::CREATED, Json(equipment_service::create(&state.db, input).await?)))
}

#[utoipa::path(put, path = "/api/equipment/{id}", tag = "equipment", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Equipment id")), request_body = crate::openapi::EquipmentInput,
    responses((status = 200, description = "Updated"), (status = 403, description = "Admin only"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdateEquipment>,
) -> Result<Json<EquipmentView>, JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    Ok(Json(equipment_service::update(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/api/equipment/{id}", tag = "equipment", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Equipment id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin only"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    equipment_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/equipment/{id}/requests", tag = "equipment", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Equipment id")),
    responses((status = 200, description = "Requests for this equipment, newest first"), (status = 404, description = "Not Found")))]
pub async fn requests(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<Vec<RequestView>>, JsonApiError> {
    Ok(Json(equipment_service::requests(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/equipment/{id}/requests/count", tag = "equipment", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Equipment id")),
    responses((status = 200, description = "Number of open requests", body = crate::openapi::CountResponse), (status = 404, description = "Not Found")))]
pub async fn requests_count(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<OpenRequestCount>, JsonApiError> {
    Ok(Json(equipment_service::open_request_count(&state.db, id).await?))
}
