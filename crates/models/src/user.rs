use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DELETED: &str = "deleted";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool { self.deleted_at.is_none() }
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && email.len() <= 255 => Ok(()),
        _ => Err(errors::ModelError::Validation("invalid email".into())),
    }
}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(errors::ModelError::Validation("username must be 3-32 characters".into()));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(errors::ModelError::Validation("username may only contain letters, digits and '_'".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if name.chars().count() > 128 { return Err(errors::ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), errors::ModelError> {
    if bio.chars().count() > 1000 { return Err(errors::ModelError::Validation("bio too long (<=1000)".into())); }
    Ok(())
}

/// Optional link fields (avatars, post images) must be absolute http(s) urls.
pub fn validate_url(u: &str) -> Result<(), errors::ModelError> {
    if !(u.starts_with("http://") || u.starts_with("https://")) || u.len() > 512 {
        return Err(errors::ModelError::Validation("url must start with http(s) and be <=512 chars".into()));
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String { email.trim().to_ascii_lowercase() }

pub async fn create<C: ConnectionTrait>(db: &C, email: &str, username: &str, name: &str) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_username(username)?;
    validate_name(name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(email)),
        username: Set(username.to_string()),
        name: Set(name.trim().to_string()),
        bio: Set(None),
        avatar_url: Set(None),
        location: Set(None),
        status: Set(STATUS_ACTIVE.into()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}

pub async fn find_active<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    let found = Entity::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(errors::ModelError::db)?;
    Ok(found)
}

pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id).one(db).await.map_err(errors::ModelError::db)?.ok_or_else(|| errors::ModelError::Validation("user not found".into()))?.into();
    let now = Utc::now();
    found.status = Set(STATUS_DELETED.into());
    found.deleted_at = Set(Some(now.into()));
    found.updated_at = Set(now.into());
    found.update(db).await.map_err(errors::ModelError::db)?;
    Ok(())
}

pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), errors::ModelError> {
    Entity::delete_by_id(id).exec(db).await.map_err(errors::ModelError::db)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_and_domain() {
        assert!(validate_email("a@b.io").is_ok());
        assert!(validate_email("@b.io").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("nobody").is_err());
    }

    #[test]
    fn username_charset_and_length() {
        assert!(validate_username("jane_doe42").is_ok());
        assert!(validate_username("jd").is_err());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn url_must_be_http() {
        assert!(validate_url("https://cdn.example.com/a.png").is_ok());
        assert!(validate_url("ftp://x").is_err());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}
