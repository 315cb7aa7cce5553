use std::{net::SocketAddr, sync::Arc};

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::{AppConfig, CorsConfig, Environment};
use service::auth::mailer::LogMailer;
use service::auth::AuthSettings;

use crate::auth::ServerState;
use crate::errors::StartupError;
use crate::routes;

/// Single configured origin with credentials, or fully permissive when none is set.
pub fn build_cors(cfg: &CorsConfig) -> Result<CorsLayer, StartupError> {
    let Some(origin) = cfg.origin.as_deref() else {
        return Ok(CorsLayer::very_permissive());
    };
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| StartupError::InvalidConfig(format!("cors.origin {origin:?}: {e}")))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// PostgreSQL gets the versioned migrations; SQLite is built straight from the entities.
async fn prepare_schema(db: &DatabaseConnection) -> Result<(), StartupError> {
    match db.get_database_backend() {
        DatabaseBackend::Sqlite => models::db::create_schema(db).await.map_err(anyhow::Error::from)?,
        _ => migration::Migrator::up(db, None).await.map_err(anyhow::Error::from)?,
    }
    info!("database schema ready");
    Ok(())
}

fn load_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Build the application from a loaded config: schema, state, bootstrap admin and router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let db = models::db::connect_with_config(&cfg.database).await.map_err(anyhow::Error::from)?;
    prepare_schema(&db).await?;

    let mailer = Arc::new(LogMailer { from: cfg.mail.from.clone() });
    let mut state = ServerState::new(db, AuthSettings::from_config(&cfg.auth, &cfg.mail), mailer);
    state.secure_cookies = cfg.environment == Environment::Production;

    if let (Some(email), Some(password)) = (&cfg.auth.bootstrap_admin_email, &cfg.auth.bootstrap_admin_password) {
        state
            .auth
            .ensure_admin(email, password)
            .await
            .map_err(|e| StartupError::Runtime(format!("bootstrap admin: {e}")))?;
    }

    let cors = build_cors(&cfg.cors)?;
    Ok(routes::build_router(state, cors))
}

/// Public entry: load config, build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env()?;
    let app = build_app(&cfg).await?;

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, environment = ?cfg.environment, "starting gearguard server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}
