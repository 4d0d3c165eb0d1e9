//! Runtime configuration: environment settings for the binaries and the
//! sport/tournament catalog that maps events to game-API ids.

use crate::models::EventType;
use crate::utils::ids::MIN_ID;
use crate::utils::payload::SportConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::api::game_api::GAME_API_BASE_URL;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub game_api_base_url: String,
    pub odds_api_key: Option<String>,
    pub bind_addr: String,
    pub start_id: u32,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let start_id = match std::env::var("START_ID") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| format!("START_ID is not a number: {}", value))?,
            Err(_) => MIN_ID,
        };

        Ok(Self {
            game_api_base_url: std::env::var("GAME_API_BASE_URL")
                .unwrap_or_else(|_| GAME_API_BASE_URL.to_string()),
            odds_api_key: std::env::var("ODDS_API_KEY").ok().filter(|k| !k.is_empty()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            start_id,
        })
    }

    pub fn require_odds_api_key(&self) -> Result<&str> {
        self.odds_api_key
            .as_deref()
            .context("ODDS_API_KEY not set in .env file")
    }
}

/// One scrapeable market in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub url: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(flatten)]
    pub sport: SportConfig,
}

/// Sport -> tournament name -> market
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub sports: BTreeMap<String, BTreeMap<String, TournamentConfig>>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        crate::utils::data::load_json(path).context("Failed to load catalog")
    }

    /// Sport names match case-insensitively, tournaments exactly.
    pub fn find(&self, sport: &str, tournament: &str) -> Option<&TournamentConfig> {
        self.sports
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(sport))
            .and_then(|(_, tournaments)| tournaments.get(tournament))
    }
}
