//! Create `follow` table (follower -> followee edges).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(uuid(Follow::Id).primary_key())
                    .col(uuid(Follow::FollowerId).not_null())
                    .col(uuid(Follow::FolloweeId).not_null())
                    .col(timestamp_with_time_zone(Follow::CreatedAt).not_null())
                    .check(Expr::col(Follow::FollowerId).ne(Expr::col(Follow::FolloweeId)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_follower")
                            .from(Follow::Table, Follow::FollowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_followee")
                            .from(Follow::Table, Follow::FolloweeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_follow_pair")
                    .table(Follow::Table)
                    .col(Follow::FollowerId)
                    .col(Follow::FolloweeId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Follow::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Follow { Table, Id, FollowerId, FolloweeId, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
