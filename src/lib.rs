pub mod cli;
pub mod config;
pub mod database_ops;
pub mod error;
pub mod orchestrator;
pub mod telemetry;

pub mod util {
    pub mod env;
}

pub use config::{AppConfig, RiotConfig, RiotId};
pub use error::{SyncError, SyncResult};
