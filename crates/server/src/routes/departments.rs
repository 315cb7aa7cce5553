use axum::{extract::{Path, State}, http::StatusCode, routing::get, Extension, Json, Router};
use uuid::Uuid;

use models::{department, Role};
use service::department_service::{self, CreateDepartment, UpdateDepartment};

use crate::auth::{CurrentUser, ServerState};
use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::authorize;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(get_one).put(update).delete(remove))
}

#[utoipa::path(get, path = "/api/departments", tag = "departments", security(("bearer" = [])),
    responses((status = 200, description = "Departments ordered by name")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<department::Model>>, JsonApiError> {
    Ok(Json(department_service::list(&state.db).await?))
}

#[utoipa::path(get, path = "/api/departments/{id}", tag = "departments", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    responses((status = 200, description = "Department"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<department::Model>, JsonApiError> {
    Ok(Json(department_service::get(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/departments", tag = "departments", security(("bearer" = [])),
    request_body = crate::openapi::DepartmentInput,
    responses((status = 201, description = "Created"), (status = 403, description = "Admin only"), (status = 409, description = "Duplicate name")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(input): ApiJson<CreateDepartment>,
) -> Result<(StatusCode, Json<department::Model>), JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    Ok((StatusCode::CREATED, Json(department_service::create(&state.db, input).await?)))
}

#[utoipa::path(put, path = "/api/departments/{id}", tag = "departments", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Department id")), request_body = crate::openapi::DepartmentInput,
    responses((status = 200, description = "Updated"), (status = 403, description = "Admin only"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ApiJson(input): ApiJson<UpdateDepartment>,
) -> Result<Json<department::Model>, JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    Ok(Json(department_service::update(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/api/departments/{id}", tag = "departments", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Department id")),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Admin only"), (status = 404, description = "Not Found")))]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    authorize(&current, &[Role::Admin])?;
    department_service::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
