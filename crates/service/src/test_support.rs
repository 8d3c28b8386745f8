#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Connection to the test database, or `None` when DB tests are disabled
/// (`SKIP_DB_TESTS` set, `DATABASE_URL` missing, or the server unreachable).
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
        return None;
    }
    let cfg = DatabaseConfig::from_env();

    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&cfg).await else { return false };
            let ok = migration::Migrator::up(&db, None).await.is_ok();
            drop(db);
            ok
        })
        .await;
    if !migrated {
        eprintln!("skip: database unavailable or migrations failed");
        return None;
    }

    // Return a fresh connection for the current test's runtime
    let mut cfg = cfg;
    cfg.max_connections = 5;
    cfg.min_connections = 1;
    cfg.acquire_timeout = std::time::Duration::from_secs(10);
    connect_with_config(&cfg).await.ok()
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Create a throwaway active user.
pub async fn make_user(db: &DatabaseConnection, prefix: &str) -> anyhow::Result<models::user::Model> {
    let handle = unique(prefix);
    Ok(models::user::create(db, &format!("{handle}@example.com"), &handle, prefix).await?)
}
