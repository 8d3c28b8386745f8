//! Create `post` table with FK to the author.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(uuid(Post::Id).primary_key())
                    .col(uuid(Post::AuthorId).not_null())
                    .col(text(Post::Content).not_null())
                    .col(string_len_null(Post::ImageUrl, 512))
                    .col(timestamp_with_time_zone(Post::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Post::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author")
                            .from(Post::Table, Post::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Post::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Post { Table, Id, AuthorId, Content, ImageUrl, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
