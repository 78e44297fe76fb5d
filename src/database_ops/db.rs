use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{PgPool, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::riot::{PlayerIdentity, PlayerProfile};
#[cfg(test)]
use super::summoners::StoredPlayer;
use super::summoners::{self, PlayerRecord};
use crate::error::{SyncError, SyncResult};

/// Keyed store for player rows. Every write commits on its own.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Create the table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), sqlx::Error>;

    /// Insert-or-update in one statement keyed on puuid.
    async fn upsert_record(&self, record: &PlayerRecord) -> SyncResult<()>;

    #[cfg(test)]
    async fn fetch(&self, puuid: &str) -> Result<Option<StoredPlayer>, sqlx::Error>;

    /// Rows currently in the table.
    async fn count(&self) -> Result<i64, sqlx::Error>;

    async fn close(&self);

    #[cfg(test)]
    fn is_closed(&self) -> bool;

    /// Merge identity and (optional) profile into one row and write it.
    async fn upsert(
        &self,
        identity: &PlayerIdentity,
        profile: Option<&PlayerProfile>,
    ) -> SyncResult<()> {
        if identity.is_placeholder() {
            warn!(
                puuid = %identity.puuid,
                "account lookup unavailable; storing placeholder name 'Unknown'"
            );
        }
        self.upsert_record(&PlayerRecord::merge(identity, profile))
            .await
    }
}

/// Open the store named by `database_url`: `sqlite:` URLs get SQLite,
/// everything else is treated as Postgres.
pub async fn connect(database_url: &str) -> Result<Box<dyn PlayerStore>> {
    if database_url.starts_with("sqlite:") {
        Ok(Box::new(SqliteStore::connect(database_url).await?))
    } else {
        Ok(Box::new(PgStore::connect(database_url).await?))
    }
}

fn storage_err(puuid: &str) -> impl FnOnce(sqlx::Error) -> SyncError + '_ {
    move |source| SyncError::Storage {
        puuid: puuid.to_string(),
        source,
    }
}

fn pg_options(database_url: &str) -> Result<PgConnectOptions> {
    let mut connect_options =
        PgConnectOptions::from_str(database_url)?.statement_cache_capacity(0);
    if database_url.contains("sslmode=require") {
        connect_options = connect_options.ssl_mode(PgSslMode::Require);
    }
    Ok(connect_options)
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(pg_options(database_url)?)
            .await
            .context("failed to connect to database")?;
        info!("connected to postgres");
        Ok(Self { pool })
    }
}

#[async_trait]
impl PlayerStore for PgStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(summoners::CREATE_TABLE_PG)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_record(&self, record: &PlayerRecord) -> SyncResult<()> {
        sqlx::query(summoners::UPSERT)
            .bind(&record.puuid)
            .bind(&record.game_name)
            .bind(&record.tag_line)
            .bind(record.summoner_level)
            .bind(record.profile_icon_id)
            .bind(Json(&record.full_response))
            .bind(record.last_updated)
            .execute(&self.pool)
            .await
            .map_err(storage_err(&record.puuid))?;
        Ok(())
    }

    #[cfg(test)]
    async fn fetch(&self, puuid: &str) -> Result<Option<StoredPlayer>, sqlx::Error> {
        sqlx::query_as::<_, StoredPlayer>(summoners::SELECT_ONE)
            .bind(puuid)
            .fetch_optional(&self.pool)
            .await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(summoners::COUNT)
            .fetch_one(&self.pool)
            .await
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // One connection for the life of the run; `sqlite::memory:` lives and dies with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open sqlite database")?;
        info!("connected to sqlite");
        Ok(Self { pool })
    }
}

#[async_trait]
impl PlayerStore for SqliteStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(summoners::CREATE_TABLE_SQLITE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn upsert_record(&self, record: &PlayerRecord) -> SyncResult<()> {
        sqlx::query(summoners::UPSERT)
            .bind(&record.puuid)
            .bind(&record.game_name)
            .bind(&record.tag_line)
            .bind(record.summoner_level)
            .bind(record.profile_icon_id)
            .bind(Json(&record.full_response))
            .bind(record.last_updated)
            .execute(&self.pool)
            .await
            .map_err(storage_err(&record.puuid))?;
        Ok(())
    }

    #[cfg(test)]
    async fn fetch(&self, puuid: &str) -> Result<Option<StoredPlayer>, sqlx::Error> {
        sqlx::query_as::<_, StoredPlayer>(summoners::SELECT_ONE)
            .bind(puuid)
            .fetch_optional(&self.pool)
            .await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(summoners::COUNT)
            .fetch_one(&self.pool)
            .await
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// Create the target Postgres database when it is missing. SQLite files are
/// created on connect, so `sqlite:` URLs are a no-op.
pub async fn ensure_database(database_url: &str) -> Result<()> {
    if database_url.starts_with("sqlite:") {
        return Ok(());
    }
    let mut admin_url = url::Url::parse(database_url).context("invalid database url")?;
    let db_name = admin_url.path().trim_start_matches('/').to_string();
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    admin_url.set_path("/postgres");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(pg_options(admin_url.as_str())?)
        .await
        .context("failed to connect to the postgres maintenance database")?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&pool)
            .await?;
    if exists {
        info!(database = %db_name, "database already exists");
    } else {
        info!(database = %db_name, "creating database");
        let stmt = format!("CREATE DATABASE {}", quote_ident(&db_name));
        sqlx::query(&stmt).execute(&pool).await?;
    }
    pool.close().await;
    Ok(())
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
