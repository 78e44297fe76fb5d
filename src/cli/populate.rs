use anyhow::Result;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database_ops::db;
use crate::database_ops::riot::RiotClient;
use crate::orchestrator;

#[derive(Debug, Clone, Default)]
pub struct PopulateConfig {
    /// Overrides RIOT_QUEUE.
    pub queue: Option<String>,
    /// Process only the first N leaderboard entries.
    pub limit: Option<usize>,
}

pub async fn run(cfg: &AppConfig, args: PopulateConfig) -> Result<()> {
    cfg.riot.validate()?;
    let queue = args.queue.unwrap_or_else(|| cfg.queue.clone());
    let client = RiotClient::new(cfg.riot.clone())?;
    let store = db::connect(&cfg.database_url).await?;

    info!(queue = %queue, "--- starting bulk population ---");
    let res = super::run_until_interrupted(
        store.as_ref(),
        async {
            let summary =
                orchestrator::run_batch(&client, store.as_ref(), &queue, client.platform(), args.limit)
                    .await?;
            let rows = store
                .count()
                .await
                .map_err(|err| warn!(error = %err, "could not count stored rows"))
                .ok();
            Ok::<_, crate::error::SyncError>((summary, rows))
        },
        tokio::signal::ctrl_c(),
    )
    .await;

    if let Some((summary, rows)) = res.transpose()? {
        info!(
            total = summary.total,
            saved = summary.saved,
            skipped = summary.skipped,
            failed_writes = summary.failed_writes,
            rows = ?rows,
            "--- done ---"
        );
    }
    Ok(())
}
