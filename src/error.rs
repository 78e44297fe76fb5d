use reqwest::StatusCode;
use thiserror::Error;

pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Failure taxonomy for the fetch-and-upsert pipeline.
///
/// `Config` and `Auth` stop the whole run; everything else is scoped to a
/// single player and is logged at the loop boundary before moving on.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized ({status}): check RIOT_API_KEY")]
    Auth { status: StatusCode },

    #[error("{0} not found")]
    NotFound(String),

    #[error("rate limited on {url}; gave up after {attempts} retries")]
    RateLimitExceeded { url: String, attempts: u32 },

    #[error("upstream error ({status}): {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error for {puuid}: {source}")]
    Storage {
        puuid: String,
        #[source]
        source: sqlx::Error,
    },
}

impl SyncError {
    /// Errors that invalidate every remaining call of the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Config(_) | SyncError::Auth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_config_and_auth_are_fatal() {
        assert!(SyncError::Config("missing key".into()).is_fatal());
        assert!(SyncError::Auth {
            status: StatusCode::FORBIDDEN
        }
        .is_fatal());
        assert!(!SyncError::NotFound("Foo#123".into()).is_fatal());
        assert!(!SyncError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            body: String::new()
        }
        .is_fatal());
        assert!(!SyncError::RateLimitExceeded {
            url: "u".into(),
            attempts: 3
        }
        .is_fatal());
    }
}
