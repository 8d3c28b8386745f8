use axum::{extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use uuid::Uuid;

use service::auth::domain::{LoginInput, RegisterInput};
use service::db::user_service::{self, OwnProfile};

use crate::auth::{CurrentUser, AUTH_COOKIE};
use crate::errors::JsonApiError;
use crate::extract::Json;
use crate::state::ServerState;

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub username: String, pub name: String, pub token: String }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let user = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { user_id: user.id })))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth_service().login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let user = session.user;
    let out = LoginOutput { user_id: user.id, email: user.email, username: user.username, name: user.name, token: session.token };
    Ok((jar.add(cookie), Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Logged Out")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    // Sent whether or not the request carried the cookie.
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    (jar.add(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> Result<Json<OwnProfile>, JsonApiError> {
    Ok(Json(user_service::get_own_profile(&state.db, user.id).await?))
}
