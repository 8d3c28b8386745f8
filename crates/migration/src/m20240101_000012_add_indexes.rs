use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Post: author timeline
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author_created")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_post")
                    .table(Comment::Table)
                    .col(Comment::PostId)
                    .to_owned(),
            )
            .await?;

        // Message: conversation history in order
        manager
            .create_index(
                Index::create()
                    .name("idx_message_conversation_created")
                    .table(Message::Table)
                    .col(Message::ConversationId)
                    .col(Message::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_customer")
                    .table(Booking::Table)
                    .col(Booking::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_owner")
                    .table(Booking::Table)
                    .col(Booking::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_listing_category")
                    .table(ServiceListing::Table)
                    .col(ServiceListing::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_post_author_created").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_comment_post").table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_message_conversation_created").table(Message::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_customer").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_owner").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_listing_category").table(ServiceListing::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Post { Table, AuthorId, CreatedAt }

#[derive(DeriveIden)]
enum Comment { Table, PostId }

#[derive(DeriveIden)]
enum Message { Table, ConversationId, CreatedAt }

#[derive(DeriveIden)]
enum Booking { Table, CustomerId, OwnerId }

#[derive(DeriveIden)]
enum ServiceListing { Table, Category }
