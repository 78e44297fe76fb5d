//! Resolve → fetch → upsert, once for a Riot ID or once per leaderboard entry.
//!
//! Per player the pipeline moves `Pending → Identified → Profiled → Saved`;
//! any not-found or unrecoverable error sends it to `Skipped` instead. Only
//! fatal errors (bad credential) leave the loop.
use tracing::{debug, error, info, warn};

use crate::config::RiotId;
use crate::database_ops::db::PlayerStore;
use crate::database_ops::riot::{mask_puuid, PlayerIdentity, RiotClient};
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Pending,
    Identified,
    Profiled,
    Saved,
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed_writes: usize,
}

/// Single-lookup mode: Riot ID → account → summoner → row.
pub async fn lookup_player(
    client: &RiotClient,
    store: &dyn PlayerStore,
    riot_id: &RiotId,
    platform: &str,
) -> SyncResult<PlayerState> {
    info!(riot_id = %riot_id, "starting lookup");
    let identity = match client
        .resolve_by_name(&riot_id.game_name, &riot_id.tag_line)
        .await
    {
        Ok(identity) => identity,
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => {
            error!(riot_id = %riot_id, error = %err, "account lookup failed");
            return Ok(PlayerState::Skipped);
        }
    };
    info!(puuid = %mask_puuid(&identity.puuid), "found puuid");
    let puuid = identity.puuid.clone();
    fetch_and_save(client, store, &puuid, Some(identity), platform).await
}

/// Batch mode: every puuid of the queue's challenger league.
pub async fn run_batch(
    client: &RiotClient,
    store: &dyn PlayerStore,
    queue: &str,
    platform: &str,
    limit: Option<usize>,
) -> SyncResult<BatchSummary> {
    let mut puuids = client.list_top_players(queue).await;
    if let Some(limit) = limit {
        puuids.truncate(limit);
    }
    info!(entries = puuids.len(), queue, "found entries in challenger league");
    run_batch_for(client, store, &puuids, platform).await
}

pub async fn run_batch_for(
    client: &RiotClient,
    store: &dyn PlayerStore,
    puuids: &[String],
    platform: &str,
) -> SyncResult<BatchSummary> {
    let mut summary = BatchSummary {
        total: puuids.len(),
        ..BatchSummary::default()
    };
    for (i, puuid) in puuids.iter().enumerate() {
        info!(
            "[{}/{}] processing puuid {}",
            i + 1,
            summary.total,
            mask_puuid(puuid)
        );
        let outcome = process_puuid(client, store, puuid, platform).await;
        summary.processed += 1;
        match outcome {
            Ok(PlayerState::Saved) => summary.saved += 1,
            Ok(_) => summary.skipped += 1,
            Err(err) if err.is_fatal() => {
                error!(error = %err, processed = summary.processed, "aborting batch");
                return Err(err);
            }
            Err(err @ SyncError::Storage { .. }) => {
                error!(puuid = %puuid, error = %err, "db error saving player");
                summary.failed_writes += 1;
            }
            Err(err) => {
                warn!(puuid = %puuid, error = %err, "skipping player");
                summary.skipped += 1;
            }
        }
    }
    info!(
        total = summary.total,
        saved = summary.saved,
        skipped = summary.skipped,
        failed_writes = summary.failed_writes,
        "batch finished"
    );
    Ok(summary)
}

/// One leaderboard entry: current names by puuid, then the profile, then the row.
pub async fn process_puuid(
    client: &RiotClient,
    store: &dyn PlayerStore,
    puuid: &str,
    platform: &str,
) -> SyncResult<PlayerState> {
    let identity = match client.resolve_by_id(puuid).await {
        Ok(identity) => Some(identity),
        Err(err) if err.is_fatal() => return Err(err),
        Err(err @ (SyncError::NotFound(_) | SyncError::InvalidInput(_))) => {
            info!(puuid = %puuid, error = %err, "account not found; skipping");
            return Ok(PlayerState::Skipped);
        }
        Err(err) => {
            warn!(puuid = %puuid, error = %err, "error fetching account; names will be 'Unknown'");
            None
        }
    };
    fetch_and_save(client, store, puuid, identity, platform).await
}

async fn fetch_and_save(
    client: &RiotClient,
    store: &dyn PlayerStore,
    puuid: &str,
    identity: Option<PlayerIdentity>,
    platform: &str,
) -> SyncResult<PlayerState> {
    if identity.is_some() {
        debug!(puuid = %puuid, state = ?PlayerState::Identified, "transition");
    }

    let profile = match client.fetch_profile(puuid, platform).await {
        Ok(profile) => {
            debug!(puuid = %puuid, state = ?PlayerState::Profiled, "transition");
            Some(profile)
        }
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) if err.is_not_found() => {
            info!(puuid = %puuid, platform, "summoner not found (might have transferred); skipping");
            return Ok(PlayerState::Skipped);
        }
        Err(err) => {
            warn!(puuid = %puuid, error = %err, "error fetching summoner; saving account fields only");
            None
        }
    };

    let identity = match (identity, &profile) {
        (Some(identity), _) => identity,
        (None, Some(_)) => PlayerIdentity::unknown(puuid),
        (None, None) => {
            warn!(puuid = %puuid, "neither account nor summoner available; skipping");
            return Ok(PlayerState::Skipped);
        }
    };

    store.upsert(&identity, profile.as_ref()).await?;
    match &profile {
        Some(p) => info!(
            riot_id = %identity.riot_id(),
            level = p.summoner_level,
            "saved"
        ),
        None => info!(riot_id = %identity.riot_id(), "saved without summoner data"),
    }
    Ok(PlayerState::Saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::db::tests::memory_store;
    use crate::database_ops::riot::testing::{test_client, FakeTransport};
    use serde_json::json;
    use std::sync::Arc;

    const LEAGUE: &str = "/challengerleagues/by-queue/RANKED_SOLO_5x5";

    fn account_path(puuid: &str) -> String {
        format!("/accounts/by-puuid/{puuid}")
    }

    fn summoner_path(puuid: &str) -> String {
        format!("/summoners/by-puuid/{puuid}")
    }

    fn seed_account(fake: &FakeTransport, puuid: &str, n: i64) {
        fake.push(
            &account_path(puuid),
            200,
            json!({"puuid": puuid, "gameName": format!("Player{n}"), "tagLine": "NA1"}),
        );
    }

    fn seed_summoner(fake: &FakeTransport, puuid: &str, n: i64) {
        fake.push(
            &summoner_path(puuid),
            200,
            json!({"puuid": puuid, "summonerLevel": 100 + n, "profileIconId": n}),
        );
    }

    fn seed_player(fake: &FakeTransport, puuid: &str, n: i64) {
        seed_account(fake, puuid, n);
        seed_summoner(fake, puuid, n);
    }

    fn seed_league(fake: &FakeTransport, puuids: &[&str]) {
        let entries: Vec<_> = puuids.iter().map(|p| json!({"puuid": p})).collect();
        fake.push(LEAGUE, 200, json!({"tier": "CHALLENGER", "entries": entries}));
    }

    #[tokio::test]
    async fn batch_skips_entry_whose_profile_is_missing() {
        let fake = Arc::new(FakeTransport::new());
        let puuids = ["puuid-1", "puuid-2", "puuid-3", "puuid-4", "puuid-5"];
        seed_league(&fake, &puuids);
        for (n, p) in puuids.iter().enumerate() {
            seed_account(&fake, p, n as i64);
            if *p != "puuid-3" {
                seed_summoner(&fake, p, n as i64);
            }
        }
        fake.push(&summoner_path("puuid-3"), 404, json!({}));
        let client = test_client(fake);
        let store = memory_store().await;

        let summary = run_batch(&client, &store, "RANKED_SOLO_5x5", "na1", None)
            .await
            .unwrap();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.processed, 5);
        assert_eq!(summary.saved, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(store.count().await.unwrap(), 4);
        assert!(store.fetch("puuid-3").await.unwrap().is_none());
        let row = store.fetch("puuid-4").await.unwrap().unwrap();
        assert_eq!(row.game_name.as_deref(), Some("Player3"));
        assert_eq!(row.summoner_level, Some(103));
    }

    #[tokio::test]
    async fn unknown_account_does_not_escape_the_loop() {
        let fake = Arc::new(FakeTransport::new());
        seed_league(&fake, &["gone", "here"]);
        seed_player(&fake, "here", 1);
        let client = test_client(fake);
        let store = memory_store().await;

        let summary = run_batch(&client, &store, "RANKED_SOLO_5x5", "na1", None)
            .await
            .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.saved, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn account_outage_stores_unknown_placeholder() {
        let fake = Arc::new(FakeTransport::new());
        seed_summoner(&fake, "abc", 5);
        fake.push(&account_path("abc"), 500, json!({"status": {"message": "boom"}}));
        let client = test_client(fake);
        let store = memory_store().await;

        let state = process_puuid(&client, &store, "abc", "na1").await.unwrap();

        assert_eq!(state, PlayerState::Saved);
        let row = store.fetch("abc").await.unwrap().unwrap();
        assert_eq!(row.game_name.as_deref(), Some("Unknown"));
        assert_eq!(row.tag_line.as_deref(), Some("Unknown"));
        assert_eq!(row.summoner_level, Some(105));
    }

    #[tokio::test]
    async fn summoner_outage_still_saves_identity() {
        let fake = Arc::new(FakeTransport::new());
        seed_account(&fake, "abc", 5);
        fake.push(&summoner_path("abc"), 502, json!({}));
        let client = test_client(fake);
        let store = memory_store().await;

        let state = process_puuid(&client, &store, "abc", "na1").await.unwrap();

        assert_eq!(state, PlayerState::Saved);
        let row = store.fetch("abc").await.unwrap().unwrap();
        assert_eq!(row.game_name.as_deref(), Some("Player5"));
        assert_eq!(row.summoner_level, None);
    }

    #[tokio::test]
    async fn bad_credential_aborts_the_batch() {
        let fake = Arc::new(FakeTransport::new());
        seed_league(&fake, &["a", "b"]);
        fake.push(&account_path("a"), 403, json!({}));
        seed_player(&fake, "b", 2);
        let client = test_client(fake.clone());
        let store = memory_store().await;

        let err = run_batch(&client, &store, "RANKED_SOLO_5x5", "na1", None)
            .await
            .unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(fake.count_calls(&account_path("b")), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn write_failures_are_counted_and_the_batch_continues() {
        let fake = Arc::new(FakeTransport::new());
        seed_player(&fake, "a", 1);
        seed_player(&fake, "b", 2);
        let client = test_client(fake);
        // no schema, every write fails
        let store = crate::database_ops::db::SqliteStore::connect("sqlite::memory:")
            .await
            .unwrap();

        let summary = run_batch_for(&client, &store, &["a".into(), "b".into()], "na1")
            .await
            .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed_writes, 2);
        assert_eq!(summary.saved, 0);
    }

    #[tokio::test]
    async fn empty_leaderboard_finishes_with_zero_entries() {
        let fake = Arc::new(FakeTransport::new());
        fake.push(LEAGUE, 500, json!({}));
        let client = test_client(fake);
        let store = memory_store().await;

        let summary = run_batch(&client, &store, "RANKED_SOLO_5x5", "na1", None)
            .await
            .unwrap();
        assert_eq!(summary, BatchSummary::default());
    }

    #[tokio::test]
    async fn limit_truncates_the_leaderboard() {
        let fake = Arc::new(FakeTransport::new());
        seed_league(&fake, &["a", "b", "c"]);
        for (n, p) in ["a", "b", "c"].iter().enumerate() {
            seed_player(&fake, p, n as i64);
        }
        let client = test_client(fake);
        let store = memory_store().await;

        let summary = run_batch(&client, &store, "RANKED_SOLO_5x5", "na1", Some(2))
            .await
            .unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn lookup_saves_canonical_names() {
        let fake = Arc::new(FakeTransport::new());
        fake.push(
            "/by-riot-id/foo/123",
            200,
            json!({"puuid": "abc", "gameName": "Foo", "tagLine": "123"}),
        );
        seed_player(&fake, "abc", 42);
        let client = test_client(fake);
        let store = memory_store().await;
        let riot_id = RiotId {
            game_name: "foo".into(),
            tag_line: "123".into(),
        };

        let state = lookup_player(&client, &store, &riot_id, "na1").await.unwrap();

        assert_eq!(state, PlayerState::Saved);
        let row = store.fetch("abc").await.unwrap().unwrap();
        assert_eq!(row.game_name.as_deref(), Some("Foo"));
        assert_eq!(row.summoner_level, Some(142));
        assert_eq!(row.profile_icon_id, Some(42));
    }

    #[tokio::test]
    async fn lookup_of_unknown_handle_is_skipped() {
        let client = test_client(Arc::new(FakeTransport::new()));
        let store = memory_store().await;
        let riot_id = RiotId {
            game_name: "Nobody".into(),
            tag_line: "000".into(),
        };

        let state = lookup_player(&client, &store, &riot_id, "na1").await.unwrap();
        assert_eq!(state, PlayerState::Skipped);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
