use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use service::auth::domain::{
    AuthSession, AuthUser, ForgotPasswordInput, LoginInput, RegisterInput, ResetPasswordInput, VerifyInput,
};
use service::user_service::{self, UserProfile};

use crate::auth::{CurrentUser, ServerState, AUTH_COOKIE};
use crate::errors::JsonApiError;
use crate::extract::ApiJson;

#[derive(Serialize)]
pub struct MessageOutput {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct VerifyOutput {
    pub message: &'static str,
    pub user: AuthUser,
}

fn auth_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 403, description = "Privileged role"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<AuthSession>), JsonApiError> {
    let session = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let jar = jar.add(auth_cookie(session.token.clone(), state.secure_cookies));
    Ok((jar, Json(session)))
}

#[utoipa::path(post, path = "/api/auth/verify", tag = "auth", request_body = crate::openapi::VerifyRequest,
    responses((status = 200, description = "Verified"), (status = 400, description = "Bad code"), (status = 404, description = "Unknown email")))]
pub async fn verify(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<VerifyInput>,
) -> Result<Json<VerifyOutput>, JsonApiError> {
    let user = state.auth.verify(input).await?;
    Ok(Json(VerifyOutput { message: "Email verified", user }))
}

#[utoipa::path(post, path = "/api/auth/forgot-password", tag = "auth", request_body = crate::openapi::ForgotPasswordRequest,
    responses((status = 200, description = "Accepted")))]
pub async fn forgot_password(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ForgotPasswordInput>,
) -> Result<Json<MessageOutput>, JsonApiError> {
    state.auth.forgot_password(input).await?;
    Ok(Json(MessageOutput { message: "If an account exists for that email, a reset link has been sent" }))
}

#[utoipa::path(post, path = "/api/auth/reset-password", tag = "auth", request_body = crate::openapi::ResetPasswordRequest,
    responses((status = 200, description = "Password changed"), (status = 400, description = "Bad Request"), (status = 401, description = "Invalid token")))]
pub async fn reset_password(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ResetPasswordInput>,
) -> Result<Json<MessageOutput>, JsonApiError> {
    state.auth.reset_password(input).await?;
    Ok(Json(MessageOutput { message: "Password has been reset" }))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<UserProfile>, JsonApiError> {
    Ok(Json(user_service::profile(&state.db, current.0.id).await?))
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "auth", security(("bearer" = [])),
    responses((status = 204, description = "Logged out")))]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}
