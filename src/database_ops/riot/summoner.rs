use tracing::instrument;
use urlencoding::encode;

use super::client::RiotClient;
use super::models::PlayerProfile;
use crate::error::{SyncError, SyncResult};

impl RiotClient {
    /// Summoner-V4 profile on the given platform shard.
    ///
    /// A 404 here usually means the account moved to another platform.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self, puuid: &str, platform: &str) -> SyncResult<PlayerProfile> {
        if puuid.trim().is_empty() || platform.trim().is_empty() {
            return Err(SyncError::InvalidInput(
                "puuid and platform must be non-empty".into(),
            ));
        }
        let path = format!("/lol/summoner/v4/summoners/by-puuid/{}", encode(puuid.trim()));
        let subject = format!("summoner for puuid {puuid} on platform {platform}");
        let raw = self.get_json(platform.trim(), &path, &subject).await?;
        PlayerProfile::from_payload(raw)
    }
}
