use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use sea_orm::sea_query::Expr;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{conversation, errors, post, user};

pub const MAX_CONTENT_CHARS: usize = 5000;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
    pub read_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Conversation, Sender }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Conversation => Entity::belongs_to(conversation::Entity).from(Column::ConversationId).to(conversation::Column::Id).into(),
            Relation::Sender => Entity::belongs_to(user::Entity).from(Column::SenderId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, conversation_id: Uuid, sender_id: Uuid, content: &str) -> Result<Model, errors::ModelError> {
    let content = post::validate_text("content", content, MAX_CONTENT_CHARS)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(conversation_id),
        sender_id: Set(sender_id),
        content: Set(content),
        created_at: Set(Utc::now().into()),
        read_at: Set(None),
    };
    am.insert(db).await.map_err(errors::ModelError::db)
}

/// Mark every unread message in the conversation not sent by `reader` as read.
pub async fn mark_read<C: ConnectionTrait>(db: &C, conversation_id: Uuid, reader: Uuid) -> Result<u64, errors::ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::ReadAt, Expr::value(now))
        .filter(Column::ConversationId.eq(conversation_id))
        .filter(Column::SenderId.ne(reader))
        .filter(Column::ReadAt.is_null())
        .exec(db)
        .await
        .map_err(errors::ModelError::db)?;
    Ok(res.rows_affected)
}
