use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use common::pagination::Pagination;
use models::listing::{self, NewListing};

use crate::errors::ServiceError;

/// Query-string filters for browsing listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub owner_id: Option<Uuid>,
    pub q: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Partial listing edit; the owner may also pause or resume it via `active`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_minutes: Option<i32>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

/// Browse listings newest first. Inactive listings only show up for their
/// owner, and only when `include_inactive` is asked for.
pub async fn list_listings(db: &DatabaseConnection, viewer: Uuid, filter: &ListingFilter, opts: Pagination) -> Result<Vec<listing::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut finder = listing::Entity::find();
    if !(filter.include_inactive && filter.owner_id == Some(viewer)) {
        finder = finder.filter(listing::Column::Active.eq(true));
    }
    if let Some(cat) = filter.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        finder = finder.filter(listing::Column::Category.eq(cat.to_ascii_lowercase()));
    }
    if let Some(owner) = filter.owner_id {
        finder = finder.filter(listing::Column::OwnerId.eq(owner));
    }
    if let Some(min) = filter.min_price {
        finder = finder.filter(listing::Column::PriceCents.gte(min));
    }
    if let Some(max) = filter.max_price {
        finder = finder.filter(listing::Column::PriceCents.lte(max));
    }
    if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        finder = finder.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col((listing::Entity, listing::Column::Title)))).like(super::contains_ci(q)))
                .add(Expr::expr(Func::lower(Expr::col((listing::Entity, listing::Column::Description)))).like(super::contains_ci(q))),
        );
    }
    finder
        .order_by_desc(listing::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)
}

pub async fn create_listing(db: &DatabaseConnection, owner_id: Uuid, input: &NewListing) -> Result<listing::Model, ServiceError> {
    let created = listing::create(db, owner_id, input).await?;
    tracing::info!(listing_id = %created.id, owner_id = %owner_id, category = %created.category, "listing_created");
    Ok(created)
}

pub async fn get_listing(db: &DatabaseConnection, id: Uuid) -> Result<listing::Model, ServiceError> {
    listing::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("service"))
}

async fn get_own_listing(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<listing::Model, ServiceError> {
    let found = get_listing(db, id).await?;
    if found.owner_id != actor {
        return Err(ServiceError::Forbidden("only the owner may change this service".into()));
    }
    Ok(found)
}

pub async fn update_listing(db: &DatabaseConnection, actor: Uuid, id: Uuid, input: ListingUpdate) -> Result<listing::Model, ServiceError> {
    let mut am: listing::ActiveModel = get_own_listing(db, actor, id).await?.into();
    if let Some(t) = input.title {
        am.title = Set(listing::validate_title(&t)?);
    }
    if let Some(d) = input.description {
        am.description = Set(d.trim().to_string());
    }
    if let Some(c) = input.category {
        am.category = Set(listing::validate_category(&c)?);
    }
    if let Some(p) = input.price_cents {
        listing::validate_price(p)?;
        am.price_cents = Set(p);
    }
    if let Some(m) = input.duration_minutes {
        listing::validate_duration(m)?;
        am.duration_minutes = Set(m);
    }
    if let Some(l) = input.location {
        let l = l.trim();
        am.location = Set((!l.is_empty()).then(|| l.to_string()));
    }
    if let Some(active) = input.active {
        am.active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(ServiceError::db)
}

pub async fn delete_listing(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    get_own_listing(db, actor, id).await?;
    listing::Entity::delete_by_id(id).exec(db).await.map_err(ServiceError::db)?;
    tracing::info!(listing_id = %id, "listing_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_user, unique};
    use models::user;

    fn new_listing(category: &str, price: i64) -> NewListing {
        NewListing {
            title: "Guitar lesson".into(),
            description: "One hour, any level".into(),
            category: category.into(),
            price_cents: price,
            duration_minutes: 60,
            location: None,
        }
    }

    #[tokio::test]
    async fn filters_and_owner_rules() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let owner = make_user(&db, "lo").await?;
        let other = make_user(&db, "lx").await?;
        let cat = unique("music");

        let cheap = create_listing(&db, owner.id, &new_listing(&cat, 1000)).await?;
        let pricey = create_listing(&db, owner.id, &new_listing(&cat, 9000)).await?;

        let f = ListingFilter { category: Some(cat.clone()), max_price: Some(5000), ..Default::default() };
        let hits = list_listings(&db, other.id, &f, Pagination::default()).await?;
        assert_eq!(hits.iter().map(|l| l.id).collect::<Vec<_>>(), vec![cheap.id]);

        let denied = update_listing(&db, other.id, pricey.id, ListingUpdate { active: Some(false), ..Default::default() }).await;
        assert!(matches!(denied, Err(ServiceError::Forbidden(_))));
        let paused = update_listing(&db, owner.id, pricey.id, ListingUpdate { active: Some(false), ..Default::default() }).await?;
        assert!(!paused.active);

        let public = ListingFilter { category: Some(cat.clone()), owner_id: Some(owner.id), include_inactive: true, ..Default::default() };
        assert_eq!(list_listings(&db, other.id, &public, Pagination::default()).await?.len(), 1);
        assert_eq!(list_listings(&db, owner.id, &public, Pagination::default()).await?.len(), 2);

        let bad = update_listing(&db, owner.id, cheap.id, ListingUpdate { duration_minutes: Some(0), ..Default::default() }).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));

        delete_listing(&db, owner.id, cheap.id).await?;
        assert!(matches!(get_listing(&db, cheap.id).await, Err(ServiceError::NotFound(_))));

        user::hard_delete(&db, owner.id).await?;
        user::hard_delete(&db, other.id).await?;
        Ok(())
    }
}
