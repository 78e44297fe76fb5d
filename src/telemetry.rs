use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Install compact, target-less log output for the binary. `RUST_LOG` wins
/// over `default_filter`; a second call fails.
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}
