use std::net::SocketAddr;

use axum::Router;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::{auth::service::AuthConfig, runtime};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Build the application router for an existing connection.
pub fn app(db: sea_orm::DatabaseConnection, cfg: &AppConfig) -> Router {
    let state = ServerState::new(db, AuthConfig::new(cfg.auth.jwt_secret.clone(), cfg.auth.token_ttl_hours));
    routes::build_router(state, build_cors())
}

/// Connect, build the app and serve until the listener fails.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    dotenv().ok();

    runtime::ensure_env(&cfg.server.data_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let db_cfg = models::db::DatabaseConfig::from(&cfg.database);
    let db = models::db::connect_with_config(&db_cfg).await?;
    models::db::ping(&db).await?;

    let app = app(db, &cfg);
    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
