//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;
use tracing::info;

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Database URL: `DATABASE_URL` verbatim, else composed from the `DB_*` variables.
pub fn db_url() -> anyhow::Result<String> {
    if let Some(v) = env_opt("DATABASE_URL") {
        return Ok(v);
    }
    let parts = DbParts {
        host: env_opt("DB_HOST").unwrap_or_else(|| "localhost".into()),
        port: env_parse("DB_PORT", 5432u16),
        database: env_opt("DB_NAME").unwrap_or_else(|| "riot_data".into()),
        user: env_opt("DB_USER").unwrap_or_else(|| "postgres".into()),
        password: env_opt("DB_PASSWORD"),
        ssl_mode: env_opt("DB_SSLMODE").unwrap_or_else(|| "prefer".into()),
    };
    build_dsn(&parts).ok_or_else(|| anyhow::anyhow!("could not compose DSN from DB_* vars"))
}

#[derive(Debug, Clone)]
pub struct DbParts {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub ssl_mode: String,
}

/// Build a postgres DSN via `url::Url` so user/password get percent-encoded.
pub fn build_dsn(parts: &DbParts) -> Option<String> {
    let mut out = url::Url::parse("postgresql://localhost").ok()?;
    out.set_username(&parts.user).ok()?;
    if let Some(pass) = parts.password.as_deref() {
        out.set_password(Some(pass)).ok()?;
    }

    let host_trimmed = parts.host.trim().trim_matches(|c| c == '[' || c == ']');
    if host_trimmed.contains(':') {
        out.set_host(Some(&format!("[{host_trimmed}]"))).ok()?;
    } else {
        out.set_host(Some(host_trimmed)).ok()?;
    }
    out.set_port(Some(parts.port)).ok()?;
    out.set_path(&format!("/{}", parts.database));

    if parts.ssl_mode != "disable" {
        out.query_pairs_mut().append_pair("sslmode", &parts.ssl_mode);
    }
    Some(out.to_string())
}

pub fn redact_value(key: &str, val: &str) -> String {
    let k = key.to_ascii_uppercase();
    if k.contains("PASSWORD") || k.contains("SECRET") || k.contains("KEY") || k.contains("TOKEN")
    {
        return "***".to_string();
    }
    let val_trim = val.trim();
    if let Ok(mut u) = url::Url::parse(val_trim) {
        let scheme = u.scheme().to_ascii_lowercase();
        if scheme == "postgres" || scheme == "postgresql" {
            let _ = u.set_username("***");
            let _ = u.set_password(Some("***"));
            return u.to_string();
        }
    }
    val_trim.to_string()
}

/// Log a consolidated, redacted snapshot of configuration.
pub fn log_snapshot(title: &str, keys: &[&str]) {
    init_env();
    let snapshot: Vec<(String, String)> = keys
        .iter()
        .map(|&k| {
            let v = env_opt(k).unwrap_or_default();
            (k.to_string(), redact_value(k, &v))
        })
        .collect();
    info!(target = "preflight", title, snapshot = ?snapshot, "configuration snapshot");
}
