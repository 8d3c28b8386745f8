use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::comment;
use service::db::{
    comment_service,
    like_service::{self, LikeState},
    post_service::{self, NewPost, PostUpdate, PostView},
};

use crate::auth::CurrentUser;
use crate::errors::JsonApiError;
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

fn page_of<T>(items: Vec<T>, page: Pagination) -> Page<T> {
    let (page, per_page) = page.echo();
    Page { items, page, per_page }
}

#[utoipa::path(get, path = "/api/posts", tag = "posts", responses((status = 200, description = "Posts, newest first")))]
pub async fn list(State(state): State<ServerState>, me: CurrentUser, Query(q): Query<PostsQuery>, Query(page): Query<Pagination>) -> Result<Json<Page<PostView>>, JsonApiError> {
    let posts = post_service::list_posts(&state.db, me.id, q.author_id, page).await?;
    Ok(Json(page_of(posts, page)))
}

#[utoipa::path(get, path = "/api/feed", tag = "posts", responses((status = 200, description = "Posts from followed users and self")))]
pub async fn feed(State(state): State<ServerState>, me: CurrentUser, Query(page): Query<Pagination>) -> Result<Json<Page<PostView>>, JsonApiError> {
    let posts = post_service::feed(&state.db, me.id, page).await?;
    Ok(Json(page_of(posts, page)))
}

#[utoipa::path(post, path = "/api/posts", tag = "posts", request_body = crate::openapi::NewPostRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(State(state): State<ServerState>, me: CurrentUser, Json(input): Json<NewPost>) -> Result<(StatusCode, Json<PostView>), JsonApiError> {
    let created = post_service::create_post(&state.db, me.id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<Json<PostView>, JsonApiError> {
    Ok(Json(post_service::get_post(&state.db, me.id, id).await?))
}

pub async fn update(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>, Json(input): Json<PostUpdate>) -> Result<Json<PostView>, JsonApiError> {
    Ok(Json(post_service::update_post(&state.db, me.id, id, input).await?))
}

pub async fn delete(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    post_service::delete_post(&state.db, me.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_comments(State(state): State<ServerState>, Path(id): Path<Uuid>, Query(page): Query<Pagination>) -> Result<Json<Page<comment::Model>>, JsonApiError> {
    let comments = comment_service::list_comments(&state.db, id, page).await?;
    Ok(Json(page_of(comments, page)))
}

pub async fn add_comment(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>, Json(input): Json<CommentInput>) -> Result<(StatusCode, Json<comment::Model>), JsonApiError> {
    let created = comment_service::add_comment(&state.db, id, me.id, &input.content).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_comment(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    comment_service::delete_comment(&state.db, me.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<Json<LikeState>, JsonApiError> {
    Ok(Json(like_service::like(&state.db, me.id, id).await?))
}

pub async fn unlike(State(state): State<ServerState>, me: CurrentUser, Path(id): Path<Uuid>) -> Result<Json<LikeState>, JsonApiError> {
    Ok(Json(like_service::unlike(&state.db, me.id, id).await?))
}
