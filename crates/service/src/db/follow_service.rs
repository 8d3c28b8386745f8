use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use common::pagination::Pagination;
use models::{errors::ModelError, follow, user};

use super::user_service::{get_active_user, load_in_order};
use crate::errors::ServiceError;

/// Make `follower` follow `followee`.
pub async fn follow_user(db: &DatabaseConnection, follower: Uuid, followee: Uuid) -> Result<follow::Model, ServiceError> {
    if follower == followee {
        return Err(ServiceError::Validation("cannot follow yourself".into()));
    }
    get_active_user(db, followee).await?;
    if follow::find(db, follower, followee).await?.is_some() {
        return Err(ServiceError::Conflict("already following".into()));
    }
    match follow::create(db, follower, followee).await {
        Ok(f) => {
            tracing::info!(follower = %follower, followee = %followee, "user_followed");
            Ok(f)
        }
        Err(ModelError::Conflict(_)) => Err(ServiceError::Conflict("already following".into())),
        Err(e) => Err(e.into()),
    }
}

pub async fn unfollow_user(db: &DatabaseConnection, follower: Uuid, followee: Uuid) -> Result<(), ServiceError> {
    let res = follow::Entity::delete_many()
        .filter(follow::Column::FollowerId.eq(follower))
        .filter(follow::Column::FolloweeId.eq(followee))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::NotFound("not following".into()));
    }
    Ok(())
}

/// Users following `user_id`, most recent first.
pub async fn followers(db: &DatabaseConnection, user_id: Uuid, opts: Pagination) -> Result<Vec<user::Model>, ServiceError> {
    get_active_user(db, user_id).await?;
    let (page_idx, per_page) = opts.normalize();
    let ids: Vec<Uuid> = follow::Entity::find()
        .select_only()
        .column(follow::Column::FollowerId)
        .filter(follow::Column::FolloweeId.eq(user_id))
        .order_by_desc(follow::Column::CreatedAt)
        .into_tuple()
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)?;
    load_in_order(db, &ids).await
}

/// Users that `user_id` follows, most recent first.
pub async fn following(db: &DatabaseConnection, user_id: Uuid, opts: Pagination) -> Result<Vec<user::Model>, ServiceError> {
    get_active_user(db, user_id).await?;
    let (page_idx, per_page) = opts.normalize();
    let ids: Vec<Uuid> = follow::Entity::find()
        .select_only()
        .column(follow::Column::FolloweeId)
        .filter(follow::Column::FollowerId.eq(user_id))
        .order_by_desc(follow::Column::CreatedAt)
        .into_tuple()
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)?;
    load_in_order(db, &ids).await
}

/// Ids of everyone `user_id` follows.
pub async fn followee_ids(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<Uuid>, ServiceError> {
    follow::Entity::find()
        .select_only()
        .column(follow::Column::FolloweeId)
        .filter(follow::Column::FollowerId.eq(user_id))
        .into_tuple()
        .all(db)
        .await
        .map_err(ServiceError::db)
}
