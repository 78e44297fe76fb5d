use anyhow::Result;
use tracing::{error, info};

use crate::config::{AppConfig, RiotId};
use crate::database_ops::db;
use crate::database_ops::riot::RiotClient;
use crate::orchestrator;

#[derive(Debug, Clone, Default)]
pub struct LookupConfig {
    /// Overrides TARGET_GAME_NAME.
    pub game_name: Option<String>,
    /// Overrides TARGET_TAG_LINE.
    pub tag_line: Option<String>,
}

pub async fn run(cfg: &AppConfig, args: LookupConfig) -> Result<()> {
    cfg.riot.validate()?;
    let riot_id: RiotId = cfg.target_or(args.game_name, args.tag_line)?;
    let client = RiotClient::new(cfg.riot.clone())?;
    let store = db::connect(&cfg.database_url).await?;

    info!(riot_id = %riot_id, "--- starting lookup ---");
    let res = super::run_until_interrupted(
        store.as_ref(),
        orchestrator::lookup_player(&client, store.as_ref(), &riot_id, client.platform()),
        tokio::signal::ctrl_c(),
    )
    .await;

    match res {
        None => {}
        Some(Ok(state)) => info!(?state, "--- done ---"),
        Some(Err(err)) if err.is_fatal() => return Err(err.into()),
        Some(Err(err)) => error!(error = %err, "lookup failed"),
    }
    Ok(())
}
