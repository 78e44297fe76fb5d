use anyhow::Result;
use serde_json::Value;
use tracing::error;

use crate::config::AppConfig;
use crate::database_ops::riot::RiotClient;

/// Print the shape of the challenger league payload: the keys of the first
/// entry and the entry itself.
pub async fn run(cfg: &AppConfig, queue: Option<String>) -> Result<()> {
    cfg.riot.validate()?;
    let queue = queue.unwrap_or_else(|| cfg.queue.clone());
    let client = RiotClient::new(cfg.riot.clone())?;

    let payload = match client.fetch_challenger_league_raw(&queue).await {
        Ok(payload) => payload,
        Err(err) if err.is_fatal() => return Err(err.into()),
        Err(err) => {
            error!(queue = %queue, error = %err, "league request failed");
            return Ok(());
        }
    };
    println!("{}", describe_first_entry(&payload));
    Ok(())
}

fn describe_first_entry(payload: &Value) -> String {
    match payload
        .get("entries")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
    {
        Some(first) => {
            let keys: Vec<&str> = first
                .as_object()
                .map(|o| o.keys().map(String::as_str).collect())
                .unwrap_or_default();
            format!(
                "Keys available in entry: {:?}\nFirst entry sample: {}",
                keys, first
            )
        }
        None => "No entries found.".to_string(),
    }
}
