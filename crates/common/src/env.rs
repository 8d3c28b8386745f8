//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the data directory exists and report which log format was requested.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    if std::env::var("JWT_SECRET").is_err() {
        warn!("JWT_SECRET not set; falling back to the development secret");
    }
    info!(%data_dir, "runtime environment ready");
    Ok(())
}
