//! Riot Games API: account lookups (regional), summoner profiles and
//! challenger leagues (platform shard).
pub mod account;
pub mod client;
pub mod league;
pub mod models;
pub mod summoner;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpTransport, RawResponse, RiotClient, Transport};
pub use models::{mask_puuid, PlayerIdentity, PlayerProfile, UNKNOWN};
