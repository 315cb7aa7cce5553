use std::sync::Arc;

use axum::{extract::{Request, State}, http::header, middleware::Next, response::{IntoResponse, Response}};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;

use service::access::Actor;
use service::auth::domain::AuthUser;
use service::auth::mailer::Mailer;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::{AuthService, AuthSettings};

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub secure_cookies: bool,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, settings: AuthSettings, mailer: Arc<dyn Mailer>) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let auth = Arc::new(AuthService::new(repo, mailer, settings));
        Self { db, auth, secure_cookies: false }
    }
}

/// The authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

fn bearer_or_cookie(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let Some(token) = h.strip_prefix("Bearer ") else {
            tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
            return Err(JsonApiError::unauthorized("expected a Bearer token"));
        };
        return Ok(Some(token.trim().to_string()));
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// Resolve `Authorization: Bearer <token>` (or the `auth_token` cookie) to a live user.
pub async fn require_auth(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let token = match bearer_or_cookie(&req) {
        Ok(Some(t)) => t,
        Ok(None) => {
            tracing::warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
            return JsonApiError::unauthorized("authentication required").into_response();
        }
        Err(e) => return e.into_response(),
    };
    match state.auth.authenticate(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), err = %e, "token validation failed");
            JsonApiError::unauthorized("invalid or expired token").into_response()
        }
    }
}
