use tracing::{debug, instrument};
use urlencoding::encode;

use super::client::RiotClient;
use super::models::PlayerIdentity;
use crate::error::{SyncError, SyncResult};

const ACCOUNTS: &str = "/riot/account/v1/accounts";

impl RiotClient {
    /// Riot ID (game name + tag line) to identity. The API answers with the
    /// canonical casing, which is what gets stored.
    #[instrument(skip(self))]
    pub async fn resolve_by_name(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> SyncResult<PlayerIdentity> {
        let game_name = game_name.trim();
        let tag_line = tag_line.trim().trim_start_matches('#');
        if game_name.is_empty() || tag_line.is_empty() {
            return Err(SyncError::InvalidInput(format!(
                "game name and tag line must be non-empty (got '{game_name}#{tag_line}')"
            )));
        }
        let path = format!(
            "{ACCOUNTS}/by-riot-id/{}/{}",
            encode(game_name),
            encode(tag_line)
        );
        let subject = format!("Riot ID '{game_name}#{tag_line}'");
        let raw = self.get_json(&self.cfg.region, &path, &subject).await?;
        let identity = PlayerIdentity::from_payload(raw)?;
        debug!(riot_id = %identity.riot_id(), "resolved account");
        Ok(identity)
    }

    /// Current name pair for a puuid.
    #[instrument(skip(self))]
    pub async fn resolve_by_id(&self, puuid: &str) -> SyncResult<PlayerIdentity> {
        let puuid = puuid.trim();
        if puuid.is_empty() {
            return Err(SyncError::InvalidInput("puuid must be non-empty".into()));
        }
        let path = format!("{ACCOUNTS}/by-puuid/{}", encode(puuid));
        let subject = format!("account for puuid {puuid}");
        let raw = self.get_json(&self.cfg.region, &path, &subject).await?;
        PlayerIdentity::from_payload(raw)
    }
}
