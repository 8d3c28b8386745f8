use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user};

pub const MAX_CONTENT_CHARS: usize = 5000;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Author }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Author => Entity::belongs_to(user::Entity).from(Column::AuthorId).to(user::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Trim and bound user-written text; returns the trimmed value.
pub fn validate_text(field: &str, value: &str, max_chars: usize) -> Result<String, errors::ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(errors::ModelError::Validation(format!("{field} required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(errors::ModelError::Validation(format!("{field} too long (<={max_chars})")));
    }
    Ok(trimmed.to_string())
}

pub async fn create<C: ConnectionTrait>(db: &C, author_id: Uuid, content: &str, image_url: Option<&str>) -> Result<Model, errors::ModelError> {
    let content = validate_text("content", content, MAX_CONTENT_CHARS)?;
    if let Some(u) = image_url { user::validate_url(u)?; }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        author_id: Set(author_id),
        content: Set(content),
        image_url: Set(image_url.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(validate_text("content", "  hi  ", 10).unwrap(), "hi");
        assert!(validate_text("content", "   ", 10).is_err());
        assert!(validate_text("content", "abcdef", 5).is_err());
    }
}
