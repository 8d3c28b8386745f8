//! Create `conversation` table.
//!
//! A conversation belongs to an unordered pair of users stored as
//! (user_a_id, user_b_id) with user_a_id < user_b_id, unique per pair.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversation::Table)
                    .if_not_exists()
                    .col(uuid(Conversation::Id).primary_key())
                    .col(uuid(Conversation::UserAId).not_null())
                    .col(uuid(Conversation::UserBId).not_null())
                    .col(timestamp_with_time_zone(Conversation::CreatedAt).not_null())
                    .col(
                        ColumnDef::new(Conversation::LastMessageAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .check(Expr::col(Conversation::UserAId).lt(Expr::col(Conversation::UserBId)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_user_a")
                            .from(Conversation::Table, Conversation::UserAId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_user_b")
                            .from(Conversation::Table, Conversation::UserBId)
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
                    .name("uniq_conversation_pair")
                    .table(Conversation::Table)
                    .col(Conversation::UserAId)
                    .col(Conversation::UserBId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Conversation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Conversation { Table, Id, UserAId, UserBId, CreatedAt, LastMessageAt }

#[derive(DeriveIden)]
enum User { Table, Id }
