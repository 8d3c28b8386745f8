//! Migrator registering table migrations in foreign-key dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_post;
mod m20240101_000004_create_comment;
mod m20240101_000005_create_post_like;
mod m20240101_000006_create_follow;
mod m20240101_000007_create_conversation;
mod m20240101_000008_create_message;
mod m20240101_000009_create_service_listing;
mod m20240101_000010_create_booking;
mod m20240101_000011_create_favorite;
mod m20240101_000012_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_post::Migration),
            Box::new(m20240101_000004_create_comment::Migration),
            Box::new(m20240101_000005_create_post_like::Migration),
            Box::new(m20240101_000006_create_follow::Migration),
            Box::new(m20240101_000007_create_conversation::Migration),
            Box::new(m20240101_000008_create_message::Migration),
            Box::new(m20240101_000009_create_service_listing::Migration),
            Box::new(m20240101_000010_create_booking::Migration),
            Box::new(m20240101_000011_create_favorite::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000012_add_indexes::Migration),
        ]
    }
}
