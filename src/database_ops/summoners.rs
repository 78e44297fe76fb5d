//! The `summoners` table: one row per puuid, merged from the account and
//! summoner payloads.
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
#[cfg(test)]
use sqlx::types::Json;

use super::riot::{PlayerIdentity, PlayerProfile};

pub(crate) const CREATE_TABLE_PG: &str = r#"
CREATE TABLE IF NOT EXISTS summoners (
    puuid VARCHAR(78) PRIMARY KEY,
    game_name VARCHAR(50),
    tag_line VARCHAR(10),
    summoner_level BIGINT,
    profile_icon_id INT,
    full_response JSONB,
    last_updated TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

pub(crate) const CREATE_TABLE_SQLITE: &str = r#"
CREATE TABLE IF NOT EXISTS summoners (
    puuid TEXT PRIMARY KEY NOT NULL,
    game_name TEXT,
    tag_line TEXT,
    summoner_level INTEGER,
    profile_icon_id INTEGER,
    full_response TEXT,
    last_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

// Profile columns keep their stored value when this write carries none.
pub(crate) const UPSERT: &str = r#"
INSERT INTO summoners
    (puuid, game_name, tag_line, summoner_level, profile_icon_id, full_response, last_updated)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (puuid) DO UPDATE SET
    game_name = excluded.game_name,
    tag_line = excluded.tag_line,
    summoner_level = COALESCE(excluded.summoner_level, summoners.summoner_level),
    profile_icon_id = COALESCE(excluded.profile_icon_id, summoners.profile_icon_id),
    full_response = excluded.full_response,
    last_updated = excluded.last_updated
"#;

#[cfg(test)]
pub(crate) const SELECT_ONE: &str = r#"
SELECT puuid, game_name, tag_line, summoner_level, profile_icon_id, full_response, last_updated
FROM summoners
WHERE puuid = $1
"#;

pub(crate) const COUNT: &str = "SELECT COUNT(*) FROM summoners";

/// One row as it will be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub summoner_level: Option<i64>,
    pub profile_icon_id: Option<i32>,
    /// `{"account": ..., "summoner": ...}` with `null` for whichever side is missing.
    pub full_response: Value,
    pub last_updated: DateTime<Utc>,
}

impl PlayerRecord {
    pub fn merge(identity: &PlayerIdentity, profile: Option<&PlayerProfile>) -> Self {
        Self {
            puuid: identity.puuid.clone(),
            game_name: identity.game_name.clone(),
            tag_line: identity.tag_line.clone(),
            summoner_level: profile.map(|p| p.summoner_level),
            profile_icon_id: profile.map(|p| p.profile_icon_id),
            full_response: json!({
                "account": identity.raw,
                "summoner": profile.map(|p| &p.raw),
            }),
            last_updated: Utc::now(),
        }
    }
}

/// One row as read back.
#[cfg(test)]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredPlayer {
    pub puuid: String,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
    pub summoner_level: Option<i64>,
    pub profile_icon_id: Option<i32>,
    pub full_response: Option<Json<Value>>,
    pub last_updated: DateTime<Utc>,
}
