//! Create `service_listing` table: bookable services offered by users.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceListing::Table)
                    .if_not_exists()
                    .col(uuid(ServiceListing::Id).primary_key())
                    .col(uuid(ServiceListing::OwnerId).not_null())
                    .col(string_len(ServiceListing::Title, 200).not_null())
                    .col(text(ServiceListing::Description).not_null())
                    .col(string_len(ServiceListing::Category, 64).not_null())
                    .col(big_integer(ServiceListing::PriceCents).not_null())
                    .col(integer(ServiceListing::DurationMinutes).not_null())
                    .col(string_len_null(ServiceListing::Location, 128))
                    .col(boolean(ServiceListing::Active).not_null())
                    .col(timestamp_with_time_zone(ServiceListing::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceListing::UpdatedAt).not_null())
                    .check(Expr::col(ServiceListing::PriceCents).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_listing_owner")
                            .from(ServiceListing::Table, ServiceListing::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceListing::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceListing {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    Category,
    PriceCents,
    DurationMinutes,
    Location,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
