use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::RiotConfig;
use crate::error::{SyncError, SyncResult};

/// Status, Retry-After header and body of one GET.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub retry_after: Option<String>,
    pub body: String,
}

/// Seam between the retry/pacing logic and the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, api_key: &str) -> SyncResult<RawResponse>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> SyncResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("summoner-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, api_key: &str) -> SyncResult<RawResponse> {
        let resp = self
            .http
            .get(url)
            .header("X-Riot-Token", api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        let retry_after = resp
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;
        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Riot API client: one request in flight, a minimum gap between requests,
/// and bounded sleep-and-retry on 429.
pub struct RiotClient {
    pub(crate) cfg: RiotConfig,
    transport: Arc<dyn Transport>,
    last_request: Mutex<Option<Instant>>,
}

impl RiotClient {
    pub fn new(cfg: RiotConfig) -> SyncResult<Self> {
        let transport = HttpTransport::new(cfg.timeout)?;
        Ok(Self::with_transport(cfg, Arc::new(transport)))
    }

    pub fn with_transport(cfg: RiotConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            cfg,
            transport,
            last_request: Mutex::new(None),
        }
    }

    pub fn platform(&self) -> &str {
        &self.cfg.platform
    }

    fn url(&self, host: &str, path: &str) -> String {
        format!("{}{}", self.cfg.api_base.replace("{host}", host), path)
    }

    /// Sleep until `pacing` has elapsed since the previous request.
    async fn pace(&self) {
        let wait = {
            let mut last = self
                .last_request
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            let wait = last
                .map(|prev| (prev + self.cfg.pacing).saturating_duration_since(now))
                .unwrap_or_default();
            *last = Some(now + wait);
            wait
        };
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "pacing");
            sleep(wait).await;
        }
    }

    /// GET `path` on `host` and decode the JSON body.
    ///
    /// `subject` names what was asked for and ends up in `NotFound`.
    pub(crate) async fn get_json(&self, host: &str, path: &str, subject: &str) -> SyncResult<Value> {
        let url = self.url(host, path);
        let mut retries = 0u32;
        loop {
            self.pace().await;
            debug!(url = %url, attempt = retries + 1, "riot request");
            let resp = self.transport.get(&url, &self.cfg.api_key).await?;
            match resp.status {
                status if status.is_success() => {
                    return serde_json::from_str(&resp.body).map_err(|source| SyncError::Decode {
                        what: "response body",
                        source,
                    });
                }
                StatusCode::NOT_FOUND => return Err(SyncError::NotFound(subject.to_string())),
                status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    return Err(SyncError::Auth { status });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    if retries >= self.cfg.max_retries {
                        return Err(SyncError::RateLimitExceeded {
                            url,
                            attempts: retries,
                        });
                    }
                    let wait = parse_retry_after(resp.retry_after.as_deref())
                        .unwrap_or(self.cfg.default_retry_after);
                    warn!(
                        url = %url,
                        wait_secs = wait.as_secs(),
                        retry = retries + 1,
                        "rate limited; sleeping before retry"
                    );
                    sleep(wait).await;
                    retries += 1;
                }
                status => {
                    return Err(SyncError::Upstream {
                        status,
                        body: resp.body,
                    });
                }
            }
        }
    }
}

/// Retry-After in delta-seconds. HTTP-date values are not sent by this API.
fn parse_retry_after(raw: Option<&str>) -> Option<Duration> {
    raw?.trim().parse::<u64>().ok().map(Duration::from_secs)
}
