#![allow(dead_code)]
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "test-secret";

pub fn test_config() -> configs::AppConfig {
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = SECRET.into();
    cfg
}

/// Router over a connection that never reaches a database.
pub fn offline_app() -> Router {
    server::startup::app(sea_orm::DatabaseConnection::Disconnected, &test_config())
}

/// Router over the test database, or `None` when DB tests are disabled.
pub async fn db_app() -> Option<Router> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return None;
    }
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from_env()).await.ok()?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrations failed: {e}");
        return None;
    }
    Some(server::startup::app(db, &test_config()))
}

pub async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

pub async fn json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() }
}

/// Register and log in a fresh user; returns (user id, token).
pub async fn signup(app: &Router, prefix: &str) -> (Uuid, String) {
    let handle = format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..10]);
    let email = format!("{handle}@example.com");
    let resp = send(app, "POST", "/auth/register", None, Some(serde_json::json!({
        "email": email, "username": handle, "name": prefix, "password": "S3curePass!"
    }))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(app, "POST", "/auth/login", None, Some(serde_json::json!({"email": email, "password": "S3curePass!"}))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    let id = Uuid::parse_str(body["user_id"].as_str().unwrap()).unwrap();
    (id, body["token"].as_str().unwrap().to_string())
}
