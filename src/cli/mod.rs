use std::future::Future;
use tracing::warn;

use crate::database_ops::db::PlayerStore;

pub mod debug_league;
pub mod lookup;
pub mod populate;
pub mod setup_db;

/// Drive `work` until it finishes or `shutdown` resolves, then close `store`
/// either way. `None` means the run was interrupted.
pub(crate) async fn run_until_interrupted<W, S>(
    store: &dyn PlayerStore,
    work: W,
    shutdown: S,
) -> Option<W::Output>
where
    W: Future,
    S: Future,
{
    let res = tokio::select! {
        res = work => Some(res),
        _ = shutdown => {
            warn!("interrupted; stopping");
            None
        }
    };
    store.close().await;
    res
}
