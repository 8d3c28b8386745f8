use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::pagination::Pagination;
use models::{follow, post, user};

use crate::errors::ServiceError;

/// Public view of another user, as embedded in lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&user::Model> for UserSummary {
    fn from(u: &user::Model) -> Self {
        Self { id: u.id, username: u.username.clone(), name: u.name.clone(), avatar_url: u.avatar_url.clone() }
    }
}

/// Profile fields anyone may see. Email and account state stay private.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl From<user::Model> for PublicUser {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, username: u.username, name: u.name, bio: u.bio, avatar_url: u.avatar_url, location: u.location, created_at: u.created_at }
    }
}

/// A user's profile with relationship counters.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: PublicUser,
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

/// The caller's own profile: the public one plus their email.
#[derive(Debug, Clone, Serialize)]
pub struct OwnProfile {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub email: String,
}

/// Partial profile edit; absent fields are left alone, empty strings clear optional fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
}

/// Active user by id, or `NotFound`.
pub async fn get_active_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::find_active(db, id).await?.ok_or_else(|| ServiceError::not_found("user"))
}

/// Search active users by username or name substring (case-insensitive), newest first.
pub async fn search_users(db: &DatabaseConnection, q: Option<&str>, opts: Pagination) -> Result<Vec<user::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut finder = user::Entity::find().filter(user::Column::DeletedAt.is_null());
    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        finder = finder.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Username)))).like(super::contains_ci(q)))
                .add(Expr::expr(Func::lower(Expr::col((user::Entity, user::Column::Name)))).like(super::contains_ci(q))),
        );
    }
    finder
        .order_by_desc(user::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)
}

/// Profile with follower/following/post counts; soft-deleted users are not found.
pub async fn get_profile(db: &DatabaseConnection, id: Uuid) -> Result<UserProfile, ServiceError> {
    let user = get_active_user(db, id).await?;
    with_counts(db, user).await
}

/// Like [`get_profile`], with the email included. Only for the account owner.
pub async fn get_own_profile(db: &DatabaseConnection, id: Uuid) -> Result<OwnProfile, ServiceError> {
    let user = get_active_user(db, id).await?;
    let email = user.email.clone();
    Ok(OwnProfile { profile: with_counts(db, user).await?, email })
}

async fn with_counts(db: &DatabaseConnection, user: user::Model) -> Result<UserProfile, ServiceError> {
    let id = user.id;
    let followers = follow::Entity::find().filter(follow::Column::FolloweeId.eq(id)).count(db).await.map_err(ServiceError::db)?;
    let following = follow::Entity::find().filter(follow::Column::FollowerId.eq(id)).count(db).await.map_err(ServiceError::db)?;
    let posts = post::Entity::find().filter(post::Column::AuthorId.eq(id)).count(db).await.map_err(ServiceError::db)?;
    Ok(UserProfile { user: user.into(), followers, following, posts })
}

fn optional(value: String) -> Option<String> {
    let t = value.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Apply a partial profile update to the caller's own account.
pub async fn update_profile(db: &DatabaseConnection, id: Uuid, input: ProfileUpdate) -> Result<user::Model, ServiceError> {
    let mut am: user::ActiveModel = get_active_user(db, id).await?.into();
    if let Some(name) = input.name {
        user::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(bio) = input.bio {
        user::validate_bio(&bio)?;
        am.bio = Set(optional(bio));
    }
    if let Some(url) = input.avatar_url {
        let url = optional(url);
        if let Some(u) = &url { user::validate_url(u)?; }
        am.avatar_url = Set(url);
    }
    if let Some(loc) = input.location {
        let loc = optional(loc);
        if loc.as_ref().is_some_and(|l| l.chars().count() > 128) {
            return Err(ServiceError::Validation("location too long (<=128)".into()));
        }
        am.location = Set(loc);
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(ServiceError::db)
}

/// Soft-delete the caller's account.
pub async fn delete_account(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    get_active_user(db, id).await?;
    user::soft_delete(db, id).await?;
    tracing::info!(user_id = %id, "account_deleted");
    Ok(())
}

/// Load active users by id and return them in the order of `ids`.
pub async fn load_in_order(db: &DatabaseConnection, ids: &[Uuid]) -> Result<Vec<user::Model>, ServiceError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut by_id: HashMap<Uuid, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.iter().copied()))
        .filter(user::Column::DeletedAt.is_null())
        .all(db)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_user, unique};

    #[tokio::test]
    async fn profile_update_and_soft_delete() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let u = make_user(&db, "prof").await?;

        let updated = update_profile(&db, u.id, ProfileUpdate {
            name: Some(" New Name ".into()),
            bio: Some("hello".into()),
            avatar_url: Some("https://img.example.com/a.png".into()),
            location: Some(String::new()),
        }).await?;
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert!(updated.location.is_none());

        let bad = update_profile(&db, u.id, ProfileUpdate { avatar_url: Some("ftp://x".into()), ..Default::default() }).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));

        let profile = get_profile(&db, u.id).await?;
        assert_eq!((profile.followers, profile.following, profile.posts), (0, 0, 0));
        let public = serde_json::to_value(&profile)?;
        assert_eq!(public["username"], u.username.as_str());
        assert!(public.get("email").is_none());
        assert!(public.get("status").is_none());
        assert!(public.get("deleted_at").is_none());
        let own = serde_json::to_value(get_own_profile(&db, u.id).await?)?;
        assert_eq!(own["email"], u.email.as_str());
        assert_eq!(own["followers"], 0);

        delete_account(&db, u.id).await?;
        assert!(matches!(get_profile(&db, u.id).await, Err(ServiceError::NotFound(_))));
        user::hard_delete(&db, u.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_username_case_insensitively() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let handle = unique("Searchme");
        let u = user::create(&db, &format!("{handle}@example.com"), &handle, "Searchable").await?;
        let hits = search_users(&db, Some(&handle.to_uppercase()), Pagination::default()).await?;
        assert!(hits.iter().any(|h| h.id == u.id));
        user::hard_delete(&db, u.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn search_treats_underscore_literally() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let tag = unique("lit");
        let under = format!("{tag}_ab");
        let other = format!("{tag}xab");
        let a = user::create(&db, &format!("{under}@example.com"), &under, "Under").await?;
        let b = user::create(&db, &format!("{other}@example.com"), &other, "Other").await?;
        let hits = search_users(&db, Some(&under), Pagination::default()).await?;
        assert!(hits.iter().any(|h| h.id == a.id));
        assert!(!hits.iter().any(|h| h.id == b.id));
        user::hard_delete(&db, a.id).await?;
        user::hard_delete(&db, b.id).await?;
        Ok(())
    }
}
