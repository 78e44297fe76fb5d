use std::time::Duration;

use crate::error::{SyncError, SyncResult};
use crate::util::env::{env_opt, env_parse};

/// Placeholder shipped in `.env.example`; treated the same as a missing key.
pub const PLACEHOLDER_API_KEY: &str = "RGAPI-YOUR-KEY-HERE";
pub const DEFAULT_QUEUE: &str = "RANKED_SOLO_5x5";
pub const DEFAULT_API_BASE: &str = "https://{host}.api.riotgames.com";

/// Riot API settings shared by the resolver, fetcher and enumerator.
#[derive(Debug, Clone)]
pub struct RiotConfig {
    pub api_key: String,
    /// Routing value for Account-V1 (americas, europe, asia, sea).
    pub region: String,
    /// Routing value for Summoner-V4 / League-V4 (na1, euw1, ...).
    pub platform: String,
    /// Base URL template; `{host}` is replaced with the region or platform.
    pub api_base: String,
    /// Minimum gap between two consecutive requests.
    pub pacing: Duration,
    pub max_retries: u32,
    /// Used when a 429 carries no usable Retry-After header.
    pub default_retry_after: Duration,
    pub timeout: Duration,
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            region: "americas".into(),
            platform: "na1".into(),
            api_base: DEFAULT_API_BASE.into(),
            pacing: Duration::from_millis(1200),
            max_retries: 8,
            default_retry_after: Duration::from_secs(10),
            timeout: Duration::from_secs(15),
        }
    }
}

impl RiotConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            api_key: env_opt("RIOT_API_KEY").unwrap_or_default(),
            region: env_opt("RIOT_REGION").unwrap_or(d.region),
            platform: env_opt("RIOT_PLATFORM").unwrap_or(d.platform),
            api_base: env_opt("RIOT_API_BASE").unwrap_or(d.api_base),
            pacing: Duration::from_millis(env_parse("RIOT_PACING_MS", 1200u64)),
            max_retries: env_parse("RIOT_MAX_RETRIES", d.max_retries),
            default_retry_after: Duration::from_secs(env_parse(
                "RIOT_DEFAULT_RETRY_AFTER_SECS",
                10u64,
            )),
            timeout: Duration::from_secs(env_parse("RIOT_HTTP_TIMEOUT_SECS", 15u64)),
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        if self.api_key.is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(SyncError::Config(
                "RIOT_API_KEY is not set correctly in .env file".into(),
            ));
        }
        if self.region.is_empty() || self.platform.is_empty() {
            return Err(SyncError::Config(
                "RIOT_REGION and RIOT_PLATFORM must not be empty".into(),
            ));
        }
        if !self.api_base.contains("{host}") {
            return Err(SyncError::Config(format!(
                "RIOT_API_BASE must contain a {{host}} placeholder (got {})",
                self.api_base
            )));
        }
        Ok(())
    }
}

/// Game name + tag line, e.g. `Faker#KR1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiotId {
    pub game_name: String,
    pub tag_line: String,
}

impl std::fmt::Display for RiotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

/// Everything a run needs, read once at start-up and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub riot: RiotConfig,
    pub target: Option<RiotId>,
    pub queue: String,
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let target = match (env_opt("TARGET_GAME_NAME"), env_opt("TARGET_TAG_LINE")) {
            (Some(game_name), Some(tag_line)) => Some(RiotId {
                game_name,
                tag_line,
            }),
            _ => None,
        };
        Ok(Self {
            riot: RiotConfig::from_env(),
            target,
            queue: env_opt("RIOT_QUEUE").unwrap_or_else(|| DEFAULT_QUEUE.into()),
            database_url: crate::util::env::db_url()?,
        })
    }

    /// Target handle for single-lookup mode; CLI overrides win over the environment.
    pub fn target_or(
        &self,
        game_name: Option<String>,
        tag_line: Option<String>,
    ) -> SyncResult<RiotId> {
        let game_name = game_name.or_else(|| self.target.as_ref().map(|t| t.game_name.clone()));
        let tag_line = tag_line.or_else(|| self.target.as_ref().map(|t| t.tag_line.clone()));
        match (game_name, tag_line) {
            (Some(game_name), Some(tag_line))
                if !game_name.trim().is_empty() && !tag_line.trim().is_empty() =>
            {
                Ok(RiotId {
                    game_name,
                    tag_line,
                })
            }
            _ => Err(SyncError::Config(
                "TARGET_GAME_NAME or TARGET_TAG_LINE (Riot ID) not set in .env file".into(),
            )),
        }
    }
}
