use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::user;
use service::db::{follow_service, user_service::{self, OwnProfile, ProfileUpdate, UserProfile, UserSummary}};

use crate::auth::CurrentUser;
use crate::errors::JsonApiError;
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

fn summaries(users: Vec<user::Model>, page: Pagination) -> Page<UserSummary> {
    let (page, per_page) = page.echo();
    Page { items: users.iter().map(UserSummary::from).collect(), page, per_page }
}

#[utoipa::path(get, path = "/api/users", tag = "users", responses((status = 200, description = "Matching users")))]
pub async fn search(State(state): State<ServerState>, Query(q): Query<SearchQuery>, Query(page): Query<Pagination>) -> Result<Json<Page<UserSummary>>, JsonApiError> {
    let found = user_service::search_users(&state.db, q.q.as_deref(), page).await?;
    Ok(Json(summaries(found, page)))
}

pub async fn me(State(state): State<ServerState>, me: CurrentUser) -> Result<Json<OwnProfile>, JsonApiError> {
    Ok(Json(user_service::get_own_profile(&state.db, me.id).await?))
}

#[utoipa::path(get, path = "/api/users/{id}", tag = "users", responses((status = 200, description = "Profile"), (status = 404, description = "Not Found")))]
pub async fn profile(State(state): State<ServerState>, Path(id): Path<Uuid>) -> Result<Json<UserProfile>, JsonApiError> {
    Ok(Json(user_service::get_profile(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/users/me", tag = "users", request_body = crate::openapi::ProfileUpdateRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Bad Request")))]
pub async fn update_me(State(state): State<ServerState>, me: CurrentUser, Json(input): Json<ProfileUpdate>) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_service::update_profile(&state.db, me.id, input).await?))
}

pub async fn delete_me(State(state): State<ServerState>, me: CurrentUser) -> Result<StatusCode, JsonApiError> {
    user_service::delete_account(&state.db, me.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/users/{id}/follow", tag = "users", responses((status = 201, description = "Following"), (status = 400, description = "Self follow"), (status = 409, description = "Already following")))]
pub async fn follow(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    follow_service::follow_user(&state.db, me.id, id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn unfollow(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    follow_service::unfollow_user(&state.db, me.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn followers(State(state): State<ServerState>, Path(id): Path<Uuid>, Query(page): Query<Pagination>) -> Result<Json<Page<UserSummary>>, JsonApiError> {
    let users = follow_service::followers(&state.db, id, page).await?;
    Ok(Json(summaries(users, page)))
}

pub async fn following(State(state): State<ServerState>, Path(id): Path<Uuid>, Query(page): Query<Pagination>) -> Result<Json<Page<UserSummary>>, JsonApiError> {
    let users = follow_service::following(&state.db, id, page).await?;
    Ok(Json(summaries(users, page)))
}
