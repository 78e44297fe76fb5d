use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;
use crate::database_ops::db;

/// Create the database (if missing) and the `summoners` table. Safe to rerun.
pub async fn run(cfg: &AppConfig) -> Result<()> {
    info!("initializing database schema");
    db::ensure_database(&cfg.database_url).await?;

    let store = db::connect(&cfg.database_url).await?;
    let res = match store.ensure_schema().await {
        Ok(()) => store.count().await,
        Err(err) => Err(err),
    }
    .context("failed to create table 'summoners'");
    store.close().await;
    let rows = res?;

    info!(rows, "database schema initialized");
    Ok(())
}
