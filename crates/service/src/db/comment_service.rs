use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use common::pagination::Pagination;
use models::comment;

use super::post_service::find_post;
use crate::errors::ServiceError;

/// Comments on a post, oldest first.
pub async fn list_comments(db: &DatabaseConnection, post_id: Uuid, opts: Pagination) -> Result<Vec<comment::Model>, ServiceError> {
    find_post(db, post_id).await?;
    let (page_idx, per_page) = opts.normalize();
    comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .order_by_asc(comment::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::db)
}

pub async fn add_comment(db: &DatabaseConnection, post_id: Uuid, author_id: Uuid, content: &str) -> Result<comment::Model, ServiceError> {
    find_post(db, post_id).await?;
    let created = comment::create(db, post_id, author_id, content).await?;
    tracing::info!(comment_id = %created.id, post_id = %post_id, "comment_added");
    Ok(created)
}

/// Remove a comment; permitted for its author and for the author of the post.
pub async fn delete_comment(db: &DatabaseConnection, actor: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let found = comment::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("comment"))?;
    if found.author_id != actor {
        let parent = find_post(db, found.post_id).await?;
        if parent.author_id != actor {
            return Err(ServiceError::Forbidden("only the comment or post author may delete this comment".into()));
        }
    }
    comment::Entity::delete_by_id(id).exec(db).await.map_err(ServiceError::db)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::post_service::{create_post, NewPost};
    use crate::test_support::{get_db, make_user};
    use models::user;

    #[tokio::test]
    async fn post_author_can_moderate_comments() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let author = make_user(&db, "ca").await?;
        let commenter = make_user(&db, "cc").await?;
        let stranger = make_user(&db, "cs").await?;
        let p = create_post(&db, author.id, NewPost { content: "post".into(), image_url: None }).await?;

        let first = add_comment(&db, p.post.id, commenter.id, "first").await?;
        let second = add_comment(&db, p.post.id, commenter.id, "second").await?;
        let listed = list_comments(&db, p.post.id, Pagination::default()).await?;
        assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);

        assert!(matches!(add_comment(&db, Uuid::new_v4(), commenter.id, "x").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_comment(&db, stranger.id, first.id).await, Err(ServiceError::Forbidden(_))));
        delete_comment(&db, author.id, first.id).await?;
        delete_comment(&db, commenter.id, second.id).await?;
        assert!(list_comments(&db, p.post.id, Pagination::default()).await?.is_empty());

        for u in [author, commenter, stranger] {
            user::hard_delete(&db, u.id).await?;
        }
        Ok(())
    }
}
