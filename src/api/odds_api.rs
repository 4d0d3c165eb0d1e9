use crate::models::RawEntry;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

const ODDS_API_BASE_URL: &str = "https://api.the-odds-api.com/v4";

/// Futures markets the relay pulls from The Odds API
pub const OUTRIGHT_SPORTS: &[&str] = &[
    "basketball_nba_championship_winner",
    "americanfootball_nfl_super_bowl_winner",
    "icehockey_nhl_championship_winner",
    "soccer_uefa_european_championship",
    "americanfootball_ncaaf_championship_winner",
    "baseball_mlb_world_series_winner",
    "basketball_ncaab_championship_winner",
    "soccer_uefa_europa_conference_league",
];

/// Response from The Odds API for a single event
#[derive(Debug, Deserialize)]
struct OddsApiEvent {
    id: String,
    bookmakers: Vec<OddsApiBookmaker>,
}

/// Bookmaker data from The Odds API
#[derive(Debug, Deserialize)]
struct OddsApiBookmaker {
    key: String,
    markets: Vec<OddsApiMarket>,
}

/// Market data (outrights, spreads, ...)
#[derive(Debug, Deserialize)]
struct OddsApiMarket {
    key: String,
    outcomes: Vec<OddsApiOutcome>,
}

/// One selection within a market
#[derive(Debug, Deserialize)]
struct OddsApiOutcome {
    name: String,
    price: f64,
}

pub struct OddsApiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, ODDS_API_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch outright (futures) prices for a sport as raw label/odds pairs.
    /// `bookmaker` picks one book's prices; without it the first book listing
    /// an outrights market is used.
    pub async fn fetch_outrights(
        &self,
        sport_key: &str,
        bookmaker: Option<&str>,
    ) -> Result<Vec<RawEntry>> {
        let url = format!("{}/sports/{}/odds", self.base_url, sport_key);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", "us"),
                ("markets", "outrights"),
                ("oddsFormat", "american"),
            ])
            .send()
            .await
            .context("Failed to fetch odds from The Odds API")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds API returned error: {}", response.status());
        }

        let events: Vec<OddsApiEvent> = response
            .json()
            .await
            .context("Failed to parse Odds API response")?;

        let entries = outright_entries(events, bookmaker);
        info!("Fetched {} outright prices for {}", entries.len(), sport_key);
        Ok(entries)
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<(Option<String>, Option<String>)> {
        let url = format!("{}/sports", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to reach The Odds API")?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Ok((header("x-requests-remaining"), header("x-requests-used")))
    }
}

fn outright_entries(events: Vec<OddsApiEvent>, bookmaker: Option<&str>) -> Vec<RawEntry> {
    let mut entries = Vec::new();

    for event in events {
        let market = event
            .bookmakers
            .into_iter()
            .filter(|b| bookmaker.map_or(true, |key| b.key == key))
            .find_map(|b| b.markets.into_iter().find(|m| m.key == "outrights"));

        let Some(market) = market else {
            warn!("Event {} has no outrights market", event.id);
            continue;
        };

        entries.extend(market.outcomes.into_iter().map(|outcome| RawEntry {
            label: outcome.name,
            odds_text: format!("{:+}", outcome.price.round() as i64),
        }));
    }

    entries
}
