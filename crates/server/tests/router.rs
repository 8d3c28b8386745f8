//! Router behaviour that never reaches the database.

mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use support::{json, offline_app, send, SECRET};

#[tokio::test]
async fn health_is_public() {
    let app = offline_app();
    let resp = send(&app, "GET", "/health", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["status"], "ok");
}

#[tokio::test]
async fn api_requires_credentials() {
    let app = offline_app();
    for uri in ["/api/posts", "/api/bookings", "/api/conversations", "/auth/me"] {
        let resp = send(&app, "GET", uri, None, None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(json(resp).await["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn malformed_authorization_is_rejected() {
    let app = offline_app();
    let req = Request::builder()
        .uri("/api/posts")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_and_expired_tokens_are_rejected() {
    let app = offline_app();
    let resp = send(&app, "GET", "/api/feed", Some("not-a-jwt"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let other_key = service::auth::token::issue("another-secret", Uuid::new_v4(), "a@b.io", 1).unwrap();
    let resp = send(&app, "GET", "/api/feed", Some(&other_key), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let expired = service::auth::token::issue(SECRET, Uuid::new_v4(), "a@b.io", -2).unwrap();
    let resp = send(&app, "GET", "/api/feed", Some(&expired), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_cookie_is_rejected() {
    let app = offline_app();
    let req = Request::builder()
        .uri("/api/services")
        .header("cookie", "theme=dark; auth_token=garbage")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = offline_app();
    let resp = send(&app, "POST", "/auth/logout", None, None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cookie = resp.headers().get("set-cookie").and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cookie.starts_with("auth_token=;"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
    assert!(cookie.contains("Path=/"), "{cookie}");
}

#[tokio::test]
async fn logout_with_cookie_expires_it_once() {
    let app = offline_app();
    let req = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("cookie", "auth_token=abc")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cookies: Vec<_> = resp.headers().get_all("set-cookie").iter().filter_map(|v| v.to_str().ok()).collect();
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("auth_token=;") && cookies[0].contains("Max-Age=0"));
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let app = offline_app();
    let resp = send(&app, "POST", "/auth/register", None, Some(serde_json::json!({}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    let body = json(resp).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["detail"].as_str().unwrap().contains("email"));

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "Bad Request");

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .body(Body::from(r#"{"email":"a@b.io","password":"x"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = offline_app();
    let resp = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = json(resp).await;
    assert!(doc["paths"]["/api/bookings/{id}/{action}"].is_object());
}
