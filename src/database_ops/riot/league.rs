use serde_json::Value;
use tracing::{error, info, instrument};
use urlencoding::encode;

use super::client::RiotClient;
use super::models::{decode, LeagueListDto};
use crate::error::SyncResult;

impl RiotClient {
    /// Challenger league payload as served, for inspection.
    #[instrument(skip(self))]
    pub async fn fetch_challenger_league_raw(&self, queue: &str) -> SyncResult<Value> {
        let path = format!(
            "/lol/league/v4/challengerleagues/by-queue/{}",
            encode(queue)
        );
        let subject = format!("challenger league for {queue}");
        self.get_json(&self.cfg.platform, &path, &subject).await
    }

    /// Full challenger league for a queue, one page.
    pub async fn fetch_challenger_league(&self, queue: &str) -> SyncResult<LeagueListDto> {
        let raw = self.fetch_challenger_league_raw(queue).await?;
        decode("league", &raw)
    }

    /// Puuids of the challenger league. Errors are logged and yield an empty
    /// list so callers can report "0 entries" and finish normally.
    pub async fn list_top_players(&self, queue: &str) -> Vec<String> {
        match self.fetch_challenger_league(queue).await {
            Ok(league) => {
                let tier = league.tier.unwrap_or_default();
                let puuids: Vec<String> = league
                    .entries
                    .into_iter()
                    .filter_map(|e| e.puuid)
                    .filter(|p| !p.is_empty())
                    .collect();
                info!(queue, %tier, entries = puuids.len(), "fetched challenger league");
                puuids
            }
            Err(err) => {
                error!(queue, error = %err, "error fetching league");
                Vec::new()
            }
        }
    }
}
