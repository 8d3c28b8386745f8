//! Create `booking` table.
//! Owner id is copied from the listing at booking time; price is a snapshot.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::ListingId).not_null())
                    .col(uuid(Booking::CustomerId).not_null())
                    .col(uuid(Booking::OwnerId).not_null())
                    .col(string_len(Booking::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Booking::StartTime).not_null())
                    .col(timestamp_with_time_zone(Booking::EndTime).not_null())
                    .col(big_integer(Booking::PriceCents).not_null())
                    .col(text_null(Booking::Notes))
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .check(Expr::col(Booking::EndTime).gt(Expr::col(Booking::StartTime)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_listing")
                            .from(Booking::Table, Booking::ListingId)
                            .to(ServiceListing::Table, ServiceListing::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_customer")
                            .from(Booking::Table, Booking::CustomerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    ListingId,
    CustomerId,
    OwnerId,
    Status,
    StartTime,
    EndTime,
    PriceCents,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ServiceListing { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
