use std::collections::HashMap;

use sea_orm::{
    sea_query::{Expr, NullOrdering},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use common::pagination::Pagination;
use models::{conversation, errors::ModelError, message};

use super::user_service::{get_active_user, load_in_order, UserSummary};
use crate::errors::ServiceError;

/// One row of the caller's inbox.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub other_user: Option<UserSummary>,
    pub last_message: Option<message::Model>,
    pub unread_count: u64,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub last_message_at: Option<sea_orm::prelude::DateTimeWithTimeZone>,
}

/// Find the conversation between `me` and `other`, creating it if needed.
///
/// Returns the conversation and whether it was created by this call.
pub async fn start_conversation(db: &DatabaseConnection, me: Uuid, other: Uuid) -> Result<(conversation::Model, bool), ServiceError> {
    if me == other {
        return Err(ServiceError::Validation("cannot start a conversation with yourself".into()));
    }
    get_active_user(db, other).await?;
    if let Some(existing) = conversation::find_by_pair(db, me, other).await? {
        return Ok((existing, false));
    }
    match conversation::create(db, me, other).await {
        Ok(created) => {
            tracing::info!(conversation_id = %created.id, "conversation_created");
            Ok((created, true))
        }
        // Lost the insert race for this pair; the winner's row is the conversation.
        Err(ModelError::Conflict(_)) => conversation::find_by_pair(db, me, other)
            .await?
            .map(|c| (c, false))
            .ok_or_else(|| ServiceError::not_found("conversation")),
        Err(e) => Err(e.into()),
    }
}

/// Conversation by id, only for its participants.
pub async fn get_conversation(db: &DatabaseConnection, me: Uuid, id: Uuid) -> Result<conversation::Model, ServiceError> {
    let found = conversation::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("conversation"))?;
    if !found.has_participant(me) {
        return Err(ServiceError::Forbidden("not a participant in this conversation".into()));
    }
    Ok(found)
}

async fn my_conversations(db: &DatabaseConnection, me: Uuid) -> Result<Vec<conversation::Model>, ServiceError> {
    conversation::Entity::find()
        .filter(Condition::any().add(conversation::Column::UserAId.eq(me)).add(conversation::Column::UserBId.eq(me)))
        .order_by_with_nulls(conversation::Column::LastMessageAt, Order::Desc, NullOrdering::Last)
        .order_by_desc(conversation::Column::CreatedAt)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

/// The caller's conversations, most recent activity first.
pub async fn list_conversations(db: &DatabaseConnection, me: Uuid) -> Result<Vec<ConversationSummary>, ServiceError> {
    let convs = my_conversations(db, me).await?;
    let other_ids: Vec<Uuid> = convs.iter().filter_map(|c| c.other_participant(me)).collect();
    let others: HashMap<Uuid, UserSummary> = load_in_order(db, &other_ids)
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    let mut out = Vec::with_capacity(convs.len());
    for c in convs {
        let last_message = message::Entity::find()
            .filter(message::Column::ConversationId.eq(c.id))
            .order_by_desc(message::Column::CreatedAt)
            .one(db)
            .await
            .map_err(ServiceError::db)?;
        let unread_count = message::Entity::find()
            .filter(message::Column::ConversationId.eq(c.id))
            .filter(message::Column::SenderId.ne(me))
            .filter(message::Column::ReadAt.is_null())
            .count(db)
            .await
            .map_err(ServiceError::db)?;
        out.push(ConversationSummary {
            id: c.id,
            other_user: c.other_participant(me).and_then(|o| others.get(&o).cloned()),
            last_message,
            unread_count,
            created_at: c.created_at,
            last_message_at: c.last_message_at,
        });
    }
    Ok(out)
}

/// A page of messages; page 1 holds the newest, each page reads oldest first.
pub async fn list_messages(db: &DatabaseConnection, me: Uuid, conversation_id: Uuid, opts: Pagination) -> Result<Vec<message::Model>, ServiceError> {
    get_conversation(db, me, conversation_id).await?;
    let (page_idx, per_page) = opts.normalize();
    let mut page = message::Entity::find()
        .filter(message::Column::ConversationId.eq(conversation_id))
        .order_by_desc(message::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)?;
    page.reverse();
    Ok(page)
}

/// Append a message and bump the conversation's activity time.
pub async fn send_message(db: &DatabaseConnection, me: Uuid, conversation_id: Uuid, content: &str) -> Result<message::Model, ServiceError> {
    get_conversation(db, me, conversation_id).await?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let sent = message::create(&txn, conversation_id, me, content).await?;
    conversation::Entity::update_many()
        .col_expr(conversation::Column::LastMessageAt, Expr::value(sent.created_at))
        .filter(conversation::Column::Id.eq(conversation_id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    tracing::info!(conversation_id = %conversation_id, message_id = %sent.id, "message_sent");
    Ok(sent)
}

/// Mark the other participant's messages as read; returns how many changed.
pub async fn mark_read(db: &DatabaseConnection, me: Uuid, conversation_id: Uuid) -> Result<u64, ServiceError> {
    get_conversation(db, me, conversation_id).await?;
    Ok(message::mark_read(db, conversation_id, me).await?)
}

/// Everyone the caller has a conversation with, one entry per person.
pub async fn contacts(db: &DatabaseConnection, me: Uuid) -> Result<Vec<UserSummary>, ServiceError> {
    let mut ids: Vec<Uuid> = Vec::new();
    for other in my_conversations(db, me).await?.iter().filter_map(|c| c.other_participant(me)) {
        if !ids.contains(&other) {
            ids.push(other);
        }
    }
    Ok(load_in_order(db, &ids).await?.iter().map(UserSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_user};
    use models::user;

    #[tokio::test]
    async fn conversation_is_shared_by_the_pair() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let a = make_user(&db, "ma").await?;
        let b = make_user(&db, "mb").await?;
        let c = make_user(&db, "mc").await?;

        let (conv, created) = start_conversation(&db, a.id, b.id).await?;
        assert!(created);
        let (again, created_again) = start_conversation(&db, b.id, a.id).await?;
        assert!(!created_again);
        assert_eq!(conv.id, again.id);
        assert!(matches!(start_conversation(&db, a.id, a.id).await, Err(ServiceError::Validation(_))));
        assert!(matches!(start_conversation(&db, a.id, Uuid::new_v4()).await, Err(ServiceError::NotFound(_))));

        send_message(&db, a.id, conv.id, "hello").await?;
        send_message(&db, a.id, conv.id, "are you there?").await?;
        assert!(matches!(send_message(&db, c.id, conv.id, "intruder").await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(list_messages(&db, c.id, conv.id, Pagination::default()).await, Err(ServiceError::Forbidden(_))));

        let msgs = list_messages(&db, b.id, conv.id, Pagination::default()).await?;
        assert_eq!(msgs.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(), vec!["hello", "are you there?"]);

        let inbox = list_conversations(&db, b.id).await?;
        let row = inbox.iter().find(|s| s.id == conv.id).expect("conversation listed");
        assert_eq!(row.unread_count, 2);
        assert_eq!(row.other_user.as_ref().map(|u| u.id), Some(a.id));
        assert_eq!(row.last_message.as_ref().map(|m| m.content.as_str()), Some("are you there?"));

        assert_eq!(mark_read(&db, b.id, conv.id).await?, 2);
        assert_eq!(list_conversations(&db, b.id).await?[0].unread_count, 0);

        start_conversation(&db, a.id, c.id).await?;
        let people = contacts(&db, a.id).await?;
        assert_eq!(people.len(), 2);

        for u in [a, b, c] {
            user::hard_delete(&db, u.id).await?;
        }
        Ok(())
    }
}
