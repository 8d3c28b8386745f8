use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::pagination::Pagination;
use models::{comment, post, post_like, user};

use super::follow_service::followee_ids;
use crate::errors::ServiceError;

/// A post as shown to a particular viewer.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post: post::Model,
    pub author_username: String,
    pub like_count: u64,
    pub comment_count: u64,
    pub liked_by_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Edit of an existing post; `image_url: Some("")` removes the image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostUpdate {
    pub content: Option<String>,
    pub image_url: Option<String>,
}

async fn like_counts(db: &DatabaseConnection, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, ServiceError> {
    let rows: Vec<(Uuid, i64)> = post_like::Entity::find()
        .select_only()
        .column(post_like::Column::PostId)
        .column_as(Expr::col(post_like::Column::Id).count(), "n")
        .filter(post_like::Column::PostId.is_in(ids.iter().copied()))
        .group_by(post_like::Column::PostId)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows.into_iter().map(|(id, n)| (id, n.max(0) as u64)).collect())
}

async fn comment_counts(db: &DatabaseConnection, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, ServiceError> {
    let rows: Vec<(Uuid, i64)> = comment::Entity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(Expr::col(comment::Column::Id).count(), "n")
        .filter(comment::Column::PostId.is_in(ids.iter().copied()))
        .group_by(comment::Column::PostId)
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows.into_iter().map(|(id, n)| (id, n.max(0) as u64)).collect())
}

/// Attach author, counters and the viewer's like flag to a page of posts.
pub async fn hydrate(db: &DatabaseConnection, viewer: Uuid, posts: Vec<post::Model>) -> Result<Vec<PostView>, ServiceError> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let author_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();

    let authors: HashMap<Uuid, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();
    let likes = like_counts(db, &ids).await?;
    let comments = comment_counts(db, &ids).await?;
    let liked: HashSet<Uuid> = post_like::Entity::find()
        .select_only()
        .column(post_like::Column::PostId)
        .filter(post_like::Column::UserId.eq(viewer))
        .filter(post_like::Column::PostId.is_in(ids.iter().copied()))
        .into_tuple::<Uuid>()
        .all(db)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .collect();

    Ok(posts
        .into_iter()
        .map(|p| PostView {
            author_username: authors.get(&p.author_id).cloned().unwrap_or_default(),
            like_count: likes.get(&p.id).copied().unwrap_or(0),
            comment_count: comments.get(&p.id).copied().unwrap_or(0),
            liked_by_me: liked.contains(&p.id),
            post: p,
        })
        .collect())
}

/// Posts newest first, optionally restricted to one author.
pub async fn list_posts(db: &DatabaseConnection, viewer: Uuid, author_id: Option<Uuid>, opts: Pagination) -> Result<Vec<PostView>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut finder = post::Entity::find();
    if let Some(a) = author_id {
        finder = finder.filter(post::Column::AuthorId.eq(a));
    }
    let posts = finder
        .order_by_desc(post::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)?;
    hydrate(db, viewer, posts).await
}

/// Posts from the people the viewer follows, plus the viewer's own.
pub async fn feed(db: &DatabaseConnection, viewer: Uuid, opts: Pagination) -> Result<Vec<PostView>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut authors = followee_ids(db, viewer).await?;
    authors.push(viewer);
    let posts = post::Entity::find()
        .filter(post::Column::AuthorId.is_in(authors))
        .order_by_desc(post::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)?;
    hydrate(db, viewer, posts).await
}

pub async fn create_post(db: &DatabaseConnection, author_id: Uuid, input: NewPost) -> Result<PostView, ServiceError> {
    let image = input.image_url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let created = post::create(db, author_id, &input.content, image).await?;
    tracing::info!(post_id = %created.id, author_id = %author_id, "post_created");
    let mut views = hydrate(db, author_id, vec![created]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("post"))
}

pub async fn find_post(db: &DatabaseConnection, id: Uuid) -> Result<post::Model, ServiceError> {
    post::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("post"))
}

pub async fn get_post(db: &DatabaseConnection, viewer: Uuid, id: Uuid) -> Result<PostView, ServiceError> {
    let found = find_post(db, id).await?;
    let mut views = hydrate(db, viewer, vec![found]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("post"))
}

async fn find_own_post(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<post::Model, ServiceError> {
    let found = find_post(db, id).await?;
    if found.author_id != actor {
        return Err(ServiceError::Forbidden("only the author may change this post".into()));
    }
    Ok(found)
}

pub async fn update_post(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: PostUpdate) -> Result<PostView, ServiceError> {
    let mut am: post::ActiveModel = find_own_post(db, actor, id).await?.into();
    if let Some(content) = input.content {
        am.content = Set(post::validate_text("content", &content, post::MAX_CONTENT_CHARS)?);
    }
    if let Some(url) = input.image_url {
        let url = url.trim();
        if url.is_empty() {
            am.image_url = Set(None);
        } else {
            user::validate_url(url)?;
            am.image_url = Set(Some(url.to_string()));
        }
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    let mut views = hydrate(db, actor, vec![updated]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("post"))
}

pub async fn delete_post(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    find_own_post(db, actor, id).await?;
    post::Entity::delete_by_id(id).exec(db).await.map_err(ServiceError::db)?;
    tracing::info!(post_id = %id, "post_deleted");
    Ok(())
}
