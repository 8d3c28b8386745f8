/// CRUD operations for the social and marketplace entities
pub mod crud_tests;


use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, DatabaseConfig};

/// Connected and migrated test database, or `None` when DB tests are disabled.
pub(crate) async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let db = connect_with_config(&DatabaseConfig::from_env()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(Some(db))
}

pub(crate) fn handle(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

pub(crate) async fn make_user(db: &DatabaseConnection, prefix: &str) -> Result<crate::user::Model> {
    let h = handle(prefix);
    Ok(crate::user::create(db, &format!("{h}@example.com"), &h, prefix).await?)
}
