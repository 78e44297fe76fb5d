//! Scripted transport for exercising the client without a network.
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use super::client::{RawResponse, RiotClient, Transport};
use crate::config::RiotConfig;
use crate::error::SyncResult;

/// Responses are keyed by URL path suffix. Each route replays its queue in
/// order and keeps repeating the last entry; unknown routes answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push_raw(&self, path: &str, resp: RawResponse) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(resp);
    }

    pub(crate) fn push(&self, path: &str, status: u16, body: Value) {
        self.push_raw(
            path,
            RawResponse {
                status: StatusCode::from_u16(status).unwrap(),
                retry_after: None,
                body: body.to_string(),
            },
        );
    }

    pub(crate) fn push_rate_limited(&self, path: &str, retry_after: Option<&str>) {
        self.push_raw(
            path,
            RawResponse {
                status: StatusCode::TOO_MANY_REQUESTS,
                retry_after: retry_after.map(str::to_string),
                body: r#"{"status":{"message":"Rate limit exceeded","status_code":429}}"#.into(),
            },
        );
    }

    pub(crate) fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count_calls(&self, path_suffix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.ends_with(path_suffix))
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, url: &str, _api_key: &str) -> SyncResult<RawResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .iter_mut()
            .filter(|(path, _)| url.ends_with(path.as_str()))
            .max_by_key(|(path, _)| path.len())
            .map(|(_, queue)| queue);
        let resp = match queue {
            Some(q) if q.len() > 1 => q.pop_front(),
            Some(q) => q.front().cloned(),
            None => None,
        };
        Ok(resp.unwrap_or_else(|| RawResponse {
            status: StatusCode::NOT_FOUND,
            retry_after: None,
            body: r#"{"status":{"message":"Data not found","status_code":404}}"#.into(),
        }))
    }
}

/// Client with no pacing and a small retry budget.
pub(crate) fn test_client<T: Transport + 'static>(transport: Arc<T>) -> RiotClient {
    let cfg = RiotConfig {
        api_key: "RGAPI-test".into(),
        api_base: "http://{host}.riot.test".into(),
        pacing: Duration::ZERO,
        max_retries: 3,
        ..RiotConfig::default()
    };
    RiotClient::with_transport(cfg, transport)
}
