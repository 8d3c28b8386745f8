use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use models::{errors::ModelError, post_like};

use super::post_service::find_post;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: u64,
}

async fn count(db: &DatabaseConnection, post_id: Uuid) -> Result<u64, ServiceError> {
    post_like::Entity::find()
        .filter(post_like::Column::PostId.eq(post_id))
        .count(db)
        .await
        .map_err(ServiceError::db)
}

/// Like a post; liking twice is a no-op.
pub async fn like(db: &DatabaseConnection, user_id: Uuid, post_id: Uuid) -> Result<LikeState, ServiceError> {
    find_post(db, post_id).await?;
    if post_like::find(db, post_id, user_id).await?.is_none() {
        match post_like::create(db, post_id, user_id).await {
            Ok(_) | Err(ModelError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(LikeState { liked: true, like_count: count(db, post_id).await? })
}

/// Remove a like; unliking a post that was not liked is a no-op.
pub async fn unlike(db: &DatabaseConnection, user_id: Uuid, post_id: Uuid) -> Result<LikeState, ServiceError> {
    find_post(db, post_id).await?;
    post_like::Entity::delete_many()
        .filter(post_like::Column::PostId.eq(post_id))
        .filter(post_like::Column::UserId.eq(user_id))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(LikeState { liked: false, like_count: count(db, post_id).await? })
}
