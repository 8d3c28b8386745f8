use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use common::pagination::Pagination;
use models::{errors::ModelError, favorite, listing};

use super::listing_service::get_listing;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct FavoriteView {
    pub favorited_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub service: listing::Model,
}

/// The caller's saved listings, most recently saved first.
pub async fn list_favorites(db: &DatabaseConnection, user_id: Uuid, opts: Pagination) -> Result<Vec<FavoriteView>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .find_also_related(listing::Entity)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows
        .into_iter()
        .filter_map(|(f, l)| l.map(|service| FavoriteView { favorited_at: f.created_at, service }))
        .collect())
}

pub async fn add_favorite(db: &DatabaseConnection, user_id: Uuid, listing_id: Uuid) -> Result<favorite::Model, ServiceError> {
    get_listing(db, listing_id).await?;
    if favorite::find(db, user_id, listing_id).await?.is_some() {
        return Err(ServiceError::Conflict("already in favorites".into()));
    }
    match favorite::create(db, user_id, listing_id).await {
        Ok(f) => Ok(f),
        Err(ModelError::Conflict(_)) => Err(ServiceError::Conflict("already in favorites".into())),
        Err(e) => Err(e.into()),
    }
}

pub async fn remove_favorite(db: &DatabaseConnection, user_id: Uuid, listing_id: Uuid) -> Result<(), ServiceError> {
    let res = favorite::Entity::delete_many()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::ListingId.eq(listing_id))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("favorite"));
    }
    Ok(())
}
