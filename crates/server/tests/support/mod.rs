#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use models::{user, Role};
use server::auth::ServerState;
use server::routes;
use service::auth::mailer::mock::RecordingMailer;
use service::auth::AuthSettings;

pub const PASSWORD: &str = "S3curePass!";
pub const ADMIN_EMAIL: &str = "admin@gearguard.test";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub mailer: Arc<RecordingMailer>,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = models::db::connect_memory().await.expect("in-memory db");
        let mailer = Arc::new(RecordingMailer::default());
        let state = ServerState::new(db, AuthSettings::with_secret("test-secret"), mailer.clone());
        let router = routes::build_router(state.clone(), CorsLayer::very_permissive());
        Self { router, state, mailer }
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        let res = self.router.clone().oneshot(req).await.expect("router is infallible");
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json body") };
        Response { status, headers, body }
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.send(req).await
    }

    /// Self-register and return `(id, token)`.
    pub async fn register(&self, email: &str, role: &str, team_id: Option<Uuid>) -> (Uuid, String) {
        let res = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "firstName": "Test",
                    "lastName": "User",
                    "role": role,
                    "teamId": team_id,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register {email}: {}", res.body);
        (id_of(&res.body["user"]), res.body["token"].as_str().expect("token").to_string())
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.call("POST", "/api/auth/login", None, Some(json!({ "email": email, "password": password }))).await
    }

    /// Bootstrap the administrator and return its token.
    pub async fn admin_token(&self) -> String {
        self.state.auth.ensure_admin(ADMIN_EMAIL, PASSWORD).await.expect("bootstrap admin");
        let res = self.login(ADMIN_EMAIL, PASSWORD).await;
        assert_eq!(res.status, StatusCode::OK);
        res.body["token"].as_str().expect("token").to_string()
    }

    /// Privileged roles are provisioned out of band; flip the stored role directly.
    pub async fn promote(&self, id: Uuid, role: Role) {
        let found = user::Entity::find_by_id(id).one(&self.state.db).await.expect("query").expect("user");
        let mut am: user::ActiveModel = found.into();
        am.role = Set(role.as_str().to_string());
        am.update(&self.state.db).await.expect("promote");
    }

    pub async fn create_team(&self, token: &str, name: &str) -> Uuid {
        let res = self
            .call("POST", "/api/teams", Some(token), Some(json!({ "name": name, "specialty": "Mechanical" })))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        id_of(&res.body)
    }

    pub async fn create_equipment(&self, token: &str, serial: &str, team_id: Uuid) -> Uuid {
        let res = self
            .call(
                "POST",
                "/api/equipment",
                Some(token),
                Some(json!({
                    "name": format!("Press {serial}"),
                    "serialNumber": serial,
                    "category": "MACHINERY",
                    "purchaseDate": "2024-01-15T00:00:00Z",
                    "location": "Plant A",
                    "maintenanceTeamId": team_id,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        id_of(&res.body)
    }

    pub async fn create_request(&self, token: &str, equipment_id: Uuid, subject: &str) -> Response {
        self.call(
            "POST",
            "/api/requests",
            Some(token),
            Some(json!({ "subject": subject, "requestType": "CORRECTIVE", "equipmentId": equipment_id })),
        )
        .await
    }
}

pub fn id_of(v: &Value) -> Uuid {
    v["id"].as_str().and_then(|s| s.parse().ok()).expect("id field")
}
