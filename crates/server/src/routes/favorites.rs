use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::favorite;
use service::db::favorite_service::{self, FavoriteView};

use crate::auth::CurrentUser;
use crate::errors::JsonApiError;
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct FavoriteInput {
    pub service_id: Uuid,
}

pub async fn list(State(state): State<ServerState>, me: CurrentUser, Query(page): Query<Pagination>) -> Result<Json<Page<FavoriteView>>, JsonApiError> {
    let items = favorite_service::list_favorites(&state.db, me.id, page).await?;
    let (page, per_page) = page.echo();
    Ok(Json(Page { items, page, per_page }))
}

#[utoipa::path(post, path = "/api/favorites", tag = "favorites", request_body = crate::openapi::FavoriteRequest, responses((status = 201, description = "Saved"), (status = 404, description = "Unknown service"), (status = 409, description = "Already saved")))]
pub async fn add(State(state): State<ServerState>, me: CurrentUser, Json(input): Json<FavoriteInput>) -> Result<(StatusCode, Json<favorite::Model>), JsonApiError> {
    let saved = favorite_service::add_favorite(&state.db, me.id, input.service_id).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn remove(State(state): State<ServerState>, me: CurrentUser, Path(service_id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    favorite_service::remove_favorite(&state.db, me.id, service_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
