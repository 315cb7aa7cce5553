use axum::{
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use models::Role;
use service::access::{self, Actor};

use crate::auth::{require_auth, CurrentUser, ServerState};
use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;

pub mod auth;
pub mod departments;
pub mod equipment;
pub mod parts;
pub mod requests;
pub mod teams;

#[utoipa::path(get, path = "/api/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn banner() -> Json<serde_json::Value> {
    Json(json!({
        "name": "GearGuard API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/docs",
    }))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found", "path": uri.path() })))
}

/// Role gate for handlers; returns the caller as a service [`Actor`].
pub(crate) fn authorize(current: &CurrentUser, roles: &[Role]) -> Result<Actor, JsonApiError> {
    let actor = current.actor();
    access::require_role(&actor, roles)?;
    Ok(actor)
}

/// Build the full application router: public auth and health, everything else behind `require_auth`.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let guard = middleware::from_fn_with_state(state.clone(), require_auth);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify", post(auth::verify))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route("/logout", post(auth::logout))
                .route_layer(guard.clone()),
        );

    let protected = Router::new()
        .nest("/departments", departments::router())
        .nest("/equipment", equipment::router())
        .nest("/teams", teams::router())
        .nest("/parts", parts::router())
        .nest("/requests", requests::router())
        .route_layer(guard);

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes)
        .merge(protected);

    Router::new()
        .route("/", get(banner))
        .nest("/api", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
