use axum::{extract::{Path, State}, http::StatusCode, routing::get, Extension, Json, Router};
use uuid::Uuid;

use models::{part, Role};
use service::part_service::{self, CreatePart, UpdatePart};

use crate::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::authorize;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/low-stock", get(low_stock))
        .route("/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(get, path = "/api/parts", tag = "parts", security(("bearer" = [])),
    responses((status = 200, description = "Parts ordered by name")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<part::Model>>, JsonApiError> {
    Ok(Json(part_service::list(&state.db).await?))
}

#[utoipa::path(get, path = "/api/parts/low-stock", tag = "parts", security(("bearer" = [])),
    responses((status = 200, description = "Parts at or below their minimum quantity")))]
pub async fn low_stock(State(state): State<ServerState>) -> Result<Json<Vec<part::Model>>, JsonApiError> {
    Ok(Json(part_service::low_stock(&state.db).await?))
}

#[utoipa::path(get, path = "/api/parts/{id}", tag = "parts", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Part id")),
    responses((status = 200, description = "Part"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<part::Model>, JsonApiError> {
    Ok(Json(part_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/parts", tag = "parts", security(("bearer" = [])),
    request_body = crate::openapi::PartInput,
    responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Admin or manager only"), (status = 409, description = "Duplicate sku")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreatePart>,
) -> Result<(StatusCode, Json<part::Model>), JsonApiError> {
    authorize(&current, &[Role::Admin, Role::Manager])?;
    Ok((StatusCode::CREATED, Json(part_service::create(&state.db, input).await?)))
}

#[utoipa::path(put, path = "/api/parts/{id}", tag = "parts", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Part id")), request_body = crate::openapi::PartInput,
    responses((status = 200, description = "Updated"), (status = 403, description = "Admin or manager only"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdatePart>,
) -> Result<Json<part::Model>, JsonApiError> {
    authorize(&current, &[Role::Admin, Role::Manager])?;
    Ok(Json(part_service::update(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/api/parts/{id}", tag = "parts", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Part id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin only"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    part_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
