use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{SyncError, SyncResult};

/// Substituted for name fields when the account lookup could not be completed.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountDto {
    puuid: String,
    game_name: Option<String>,
    tag_line: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummonerDto {
    puuid: String,
    summoner_level: i64,
    profile_icon_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueListDto {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub entries: Vec<LeagueItemDto>,
}

/// Only the puuid is read; rank fields are left to `debug-league`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueItemDto {
    #[serde(default)]
    pub puuid: Option<String>,
}

/// Name pair currently attached to a puuid. Names change; the puuid does not.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerIdentity {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    /// Account payload as returned by the API; `None` for placeholders.
    pub raw: Option<Value>,
}

impl PlayerIdentity {
    pub fn new(puuid: impl Into<String>, game_name: impl Into<String>, tag_line: impl Into<String>) -> Self {
        Self {
            puuid: puuid.into(),
            game_name: game_name.into(),
            tag_line: tag_line.into(),
            raw: None,
        }
    }

    /// Placeholder used when only the profile lookup succeeded.
    pub fn unknown(puuid: impl Into<String>) -> Self {
        Self::new(puuid, UNKNOWN, UNKNOWN)
    }

    pub fn is_placeholder(&self) -> bool {
        self.raw.is_none() && self.game_name == UNKNOWN && self.tag_line == UNKNOWN
    }

    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }

    pub(crate) fn from_payload(raw: Value) -> SyncResult<Self> {
        let dto: AccountDto = decode("account", &raw)?;
        Ok(Self {
            puuid: dto.puuid,
            game_name: dto.game_name.unwrap_or_else(|| UNKNOWN.into()),
            tag_line: dto.tag_line.unwrap_or_else(|| UNKNOWN.into()),
            raw: Some(raw),
        })
    }
}

/// Mutable profile attributes served by the platform shard.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub puuid: String,
    pub summoner_level: i64,
    pub profile_icon_id: i32,
    pub raw: Value,
}

impl PlayerProfile {
    pub(crate) fn from_payload(raw: Value) -> SyncResult<Self> {
        let dto: SummonerDto = decode("summoner", &raw)?;
        if dto.summoner_level < 0 {
            return Err(SyncError::InvalidInput(format!(
                "negative summonerLevel {} for {}",
                dto.summoner_level, dto.puuid
            )));
        }
        Ok(Self {
            puuid: dto.puuid,
            summoner_level: dto.summoner_level,
            profile_icon_id: dto.profile_icon_id,
            raw,
        })
    }
}

pub(crate) fn decode<T: DeserializeOwned>(what: &'static str, raw: &Value) -> SyncResult<T> {
    T::deserialize(raw).map_err(|source| SyncError::Decode { what, source })
}

/// Shortened puuid for log lines, `abcde...vwxyz`.
pub fn mask_puuid(puuid: &str) -> String {
    let chars: Vec<char> = puuid.chars().collect();
    if chars.len() <= 10 {
        return puuid.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn account_payload_keeps_raw_json() {
        let raw = json!({"puuid": "abc", "gameName": "Foo", "tagLine": "123"});
        let id = PlayerIdentity::from_payload(raw.clone()).unwrap();
        assert_eq!(id.game_name, "Foo");
        assert_eq!(id.tag_line, "123");
        assert_eq!(id.raw, Some(raw));
        assert!(!id.is_placeholder());
    }

    #[test]
    fn account_without_names_falls_back_to_unknown() {
        let id = PlayerIdentity::from_payload(json!({"puuid": "abc"})).unwrap();
        assert_eq!(id.riot_id(), "Unknown#Unknown");
    }

    #[test]
    fn summoner_payload_requires_level_and_icon() {
        let err = PlayerProfile::from_payload(json!({"puuid": "abc", "profileIconId": 7}))
            .unwrap_err();
        assert!(matches!(err, SyncError::Decode { what: "summoner", .. }));

        let p = PlayerProfile::from_payload(
            json!({"puuid": "abc", "summonerLevel": 42, "profileIconId": 7, "revisionDate": 1}),
        )
        .unwrap();
        assert_eq!((p.summoner_level, p.profile_icon_id), (42, 7));
    }

    #[test]
    fn negative_level_rejected() {
        let err = PlayerProfile::from_payload(
            json!({"puuid": "abc", "summonerLevel": -1, "profileIconId": 7}),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
    }

    #[test]
    fn masks_long_puuids_only() {
        assert_eq!(mask_puuid("abcdefghijklmnop"), "abcde...lmnop");
        assert_eq!(mask_puuid("short"), "short");
    }
}
