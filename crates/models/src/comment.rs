use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, post, user};

pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Post, Author }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Post => Entity::belongs_to(post::Entity).from(Column::PostId).to(post::Column::Id).into(),
            Relation::Author => Entity::belongs_to(user::Entity).from(Column::AuthorId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, post_id: Uuid, author_id: Uuid, content: &str) -> Result<Model, errors::ModelError> {
    let content = post::validate_text("content", content, MAX_CONTENT_CHARS)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        post_id: Set(post_id),
        author_id: Set(author_id),
        content: Set(content),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}
