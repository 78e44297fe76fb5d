use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use summoner_sync::cli::{debug_league, lookup, populate, setup_db};
use summoner_sync::telemetry::init_tracing;
use summoner_sync::util::env;
use summoner_sync::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "summoner-sync",
    version,
    about = "Fetch Riot player data and upsert it into the summoners table"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Create the database (if missing) and the summoners table
    SetupDb,
    /// Look up one Riot ID and save it
    Lookup {
        /// Game name (defaults to TARGET_GAME_NAME)
        #[arg(long)]
        game_name: Option<String>,
        /// Tag line without '#' (defaults to TARGET_TAG_LINE)
        #[arg(long)]
        tag_line: Option<String>,
    },
    /// Save every player of the challenger league
    Populate {
        /// Ranked queue (defaults to RIOT_QUEUE or RANKED_SOLO_5x5)
        #[arg(long)]
        queue: Option<String>,
        /// Only process the first N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the keys and first entry of the challenger league payload
    DebugLeague {
        /// Ranked queue (defaults to RIOT_QUEUE or RANKED_SOLO_5x5)
        #[arg(long)]
        queue: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env::init_env();
    init_tracing("summoner_sync=info")?;
    env::log_snapshot(
        "summoner-sync",
        &[
            "RIOT_API_KEY",
            "RIOT_REGION",
            "RIOT_PLATFORM",
            "RIOT_QUEUE",
            "TARGET_GAME_NAME",
            "TARGET_TAG_LINE",
            "DATABASE_URL",
            "DB_HOST",
            "DB_NAME",
            "DB_USER",
            "DB_PASSWORD",
        ],
    );

    let cfg = AppConfig::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::SetupDb => setup_db::run(&cfg).await,
        Commands::Lookup {
            game_name,
            tag_line,
        } => {
            lookup::run(
                &cfg,
                lookup::LookupConfig {
                    game_name,
                    tag_line,
                },
            )
            .await
        }
        Commands::Populate { queue, limit } => {
            populate::run(&cfg, populate::PopulateConfig { queue, limit }).await
        }
        Commands::DebugLeague { queue } => debug_league::run(&cfg, queue).await,
    }
}
