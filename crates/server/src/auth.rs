//! Session authentication: the `require_auth` middleware and the
//! `CurrentUser` extractor handlers take.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// The authenticated caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| JsonApiError::unauthorized("authentication required"))
    }
}

/// Bearer token from the Authorization header, else the session cookie.
fn extract_token(req: &Request) -> Result<String, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let h = h.to_str().map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(t.trim().to_string()),
            _ => {
                tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
                Err(JsonApiError::unauthorized("malformed Authorization header"))
            }
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    match jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => {
            tracing::warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
            Err(JsonApiError::unauthorized("authentication required"))
        }
    }
}

/// Reject the request with 401 unless it carries a valid session for an active user.
pub async fn require_auth(State(state): State<ServerState>, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let raw = extract_token(&req)?;
    let claims = state.auth_service().authenticate(&raw).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), error = %e, "token rejected");
        JsonApiError::unauthorized("invalid or expired token")
    })?;
    let user_id = claims.user_id().map_err(|_| JsonApiError::unauthorized("invalid or expired token"))?;
    let active = models::user::find_active(&state.db, user_id)
        .await
        .map_err(|e| JsonApiError::from(service::errors::ServiceError::from(e)))?;
    if active.is_none() {
        return Err(JsonApiError::unauthorized("account no longer active"));
    }
    req.extensions_mut().insert(CurrentUser { id: user_id, email: claims.email });
    Ok(next.run(req).await)
}
