use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use odds_relay::api::game_api::GameApiClient;
use odds_relay::api::odds_api::{OddsApiClient, OUTRIGHT_SPORTS};
use odds_relay::config::{Catalog, RelayConfig};
use odds_relay::payload::{build_event_payload, build_line_payloads, EventPayload, SportConfig};
use odds_relay::scrapers::{default_strategies, extract_entries, extract_headers, Extraction};
use odds_relay::scrapers::extract::DRAFTKINGS_HEADER_SELECTOR;
use odds_relay::store::{JsonFileStore, OddsStore};
use odds_relay::tournament::TournamentType;
use odds_relay::utils::data::{load_json, save_json, save_records_to_csv};
use odds_relay::{
    build_event, event_name, process_entries, process_lines, ContaminationFilter, EventType,
    LineEntries, PipelineOptions, RawEntry, Record, ScrapedEvent, SequentialIdAssigner,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "odds-relay")]
#[command(about = "Clean sportsbook futures odds and relay them to the game API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and price raw entries (JSON) or a saved sportsbook page (HTML)
    Process {
        /// Raw entries JSON, or an .html page
        input: PathBuf,
        /// Page URL, used to pick the name roster and store key
        #[arg(long, default_value = "")]
        url: String,
        /// championship, conference or division
        #[arg(long, default_value = "championship")]
        event_type: String,
        /// Where to write the processed event JSON
        #[arg(short, long, default_value = "cache/processed.json")]
        output: PathBuf,
        /// Also write the records as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Keep the records in a JSON store directory, keyed by --url
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Build game API payloads from a processed event
    Payload {
        /// Processed event JSON, or betting lines JSON with --lines.
        /// Without it the records stored for --url are used.
        #[arg(required_unless_present = "store")]
        input: Option<PathBuf>,
        /// JSON store directory written by `process --store`
        #[arg(long, conflicts_with = "lines")]
        store: Option<PathBuf>,
        /// Input holds raw betting lines ([{label, entries}]) instead of an event
        #[arg(long)]
        lines: bool,
        #[arg(long, default_value = "")]
        url: String,
        /// Event name; detected from the URL when omitted
        #[arg(long)]
        name: Option<String>,
        /// Catalog JSON mapping sport -> tournament -> ids
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long, requires = "catalog")]
        sport: Option<String>,
        #[arg(long, requires = "catalog")]
        tournament: Option<String>,
        /// First 7-digit id (defaults to START_ID or 1000000)
        #[arg(long)]
        start_id: Option<u32>,
        #[arg(short, long, default_value = "cache/payloads.json")]
        output: PathBuf,
    },
    /// Fetch outright prices from The Odds API as raw entries
    Fetch {
        /// e.g. americanfootball_nfl_super_bowl_winner; every known
        /// futures market when omitted
        sport_key: Option<String>,
        #[arg(long)]
        bookmaker: Option<String>,
        #[arg(short, long, default_value = "cache/raw_entries.json")]
        output: PathBuf,
    },
    /// Submit payloads to the game API
    Submit {
        /// Payloads JSON written by `payload`
        input: PathBuf,
        /// Where to write the submission results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;

    match Cli::parse().command {
        Commands::Process {
            input,
            url,
            event_type,
            output,
            csv,
            store,
        } => {
            let event_type: EventType = event_type.parse()?;
            let event = process(&input, &url, event_type)?;
            let records: Vec<Record> = event.records().into_iter().cloned().collect();

            save_json(&event, &output)?;
            println!("Processed {} teams -> {}", event.team_count(), output.display());

            if let Some(csv) = csv {
                save_records_to_csv(&records, &csv)?;
                println!("Saved CSV to {}", csv.display());
            }
            if let Some(dir) = store {
                if url.is_empty() {
                    anyhow::bail!("--store needs --url to key the records");
                }
                let mut store = JsonFileStore::open(dir)?;
                store.put(&url, records)?;
                println!("Stored records for {} in {}", url, store.dir().display());
            }
        }
        Commands::Payload {
            input,
            store,
            lines,
            url,
            name,
            catalog,
            sport,
            tournament,
            start_id,
            output,
        } => {
            let (url, sport) = match (catalog, sport, tournament) {
                (Some(path), Some(sport), Some(tournament)) => {
                    let catalog = Catalog::load(path)?;
                    let entry = catalog
                        .find(&sport, &tournament)
                        .with_context(|| format!("{} / {} not in catalog", sport, tournament))?;
                    let url = if url.is_empty() { entry.url.clone() } else { url };
                    (url, entry.sport.clone())
                }
                _ => (url, SportConfig::default()),
            };
            let name = name.unwrap_or_else(|| event_name(&url, &sport.description));
            let mut ids = SequentialIdAssigner::new(start_id.unwrap_or(config.start_id))?;
            let timestamp = chrono::Local::now().naive_local();

            let payloads = if lines {
                let input = input.context("--lines needs an input file")?;
                let lines: Vec<LineEntries> = load_json(&input)?;
                let labels: Vec<&str> = lines.iter().map(|l| l.label.as_str()).collect();
                let missing = TournamentType::detect(&url).missing_lines(labels);
                if !missing.is_empty() {
                    warn!("No odds given for betting lines: {:?}", missing);
                }
                let grouping = process_lines(
                    lines,
                    &PipelineOptions::for_url(&url),
                    &ContaminationFilter::default(),
                );
                build_line_payloads(&name, &grouping, &sport, &mut ids, timestamp)?
            } else if let Some(input) = input {
                let event: ScrapedEvent = load_json(&input)?;
                vec![build_event_payload(&name, event.records(), &sport, &mut ids, timestamp)?]
            } else {
                let records = stored_records(store.as_deref(), &url)?;
                vec![build_event_payload(&name, &records, &sport, &mut ids, timestamp)?]
            };

            save_json(&payloads, &output)?;
            for payload in &payloads {
                if let Some((first, last)) = payload.id_range() {
                    println!(
                        "{}: {} teams, ids {} - {}",
                        payload.game_creation_payload.home_team,
                        payload.odds_submission_payload.len(),
                        first,
                        last
                    );
                }
            }
            println!("Saved {} payloads to {}", payloads.len(), output.display());
        }
        Commands::Fetch {
            sport_key,
            bookmaker,
            output,
        } => {
            let client = OddsApiClient::new(config.require_odds_api_key()?.to_string());
            let entries = match sport_key {
                Some(sport_key) => client
                    .fetch_outrights(&sport_key, bookmaker.as_deref())
                    .await
                    .context("Failed to fetch outrights")?,
                None => {
                    let mut entries = Vec::new();
                    for sport_key in OUTRIGHT_SPORTS {
                        match client.fetch_outrights(sport_key, bookmaker.as_deref()).await {
                            Ok(fetched) => entries.extend(fetched),
                            Err(e) => warn!("Skipping {}: {:#}", sport_key, e),
                        }
                    }
                    entries
                }
            };
            save_json(&entries, &output)?;
            println!("Saved {} raw entries to {}", entries.len(), output.display());

            if let Ok((remaining, used)) = client.check_usage().await {
                info!("Odds API requests remaining: {:?}, used: {:?}", remaining, used);
            }
        }
        Commands::Submit { input, output } => {
            let payloads: Vec<EventPayload> = load_json(&input)?;
            let client = GameApiClient::new(&config.game_api_base_url)?;

            let mut results = Vec::with_capacity(payloads.len());
            for payload in &payloads {
                let result = client.submit(payload).await;
                match (&result.game_id, &result.error) {
                    (_, Some(error)) => println!(
                        "FAILED {}: {}",
                        payload.game_creation_payload.home_team, error
                    ),
                    (Some(game_id), None) => println!(
                        "OK {} -> game {} ({} odds)",
                        payload.game_creation_payload.home_team, game_id, result.odds_count
                    ),
                    (None, None) => {}
                }
                results.push(result);
            }

            let failed = results.iter().filter(|r| !r.success).count();
            println!("\n{} submitted, {} failed", results.len() - failed, failed);
            if let Some(output) = output {
                save_json(&results, &output)?;
            }
            if failed > 0 {
                anyhow::bail!("{} of {} submissions failed", failed, results.len());
            }
        }
    }

    Ok(())
}

/// Records saved by `process --store` for `url`
fn stored_records(dir: Option<&Path>, url: &str) -> Result<Vec<Record>> {
    let dir = dir.context("Either an input file or --store is required")?;
    let store = JsonFileStore::open(dir)?;
    store.get(url)?.with_context(|| {
        format!(
            "No records stored for {} in {} (stored: {:?})",
            url,
            store.dir().display(),
            store.keys().unwrap_or_default()
        )
    })
}

/// Read raw entries from JSON or a saved page and run them through the pipeline
fn process(input: &Path, url: &str, event_type: EventType) -> Result<ScrapedEvent> {
    let is_html = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

    let (entries, headers): (Vec<RawEntry>, Vec<String>) = if is_html {
        let html = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let entries = match extract_entries(&html, &default_strategies())? {
            Extraction::Found { entries, .. } => entries,
            Extraction::Exhausted { tried } => {
                anyhow::bail!("No odds found in {} (tried {:?})", input.display(), tried)
            }
        };
        (entries, extract_headers(&html, DRAFTKINGS_HEADER_SELECTOR)?)
    } else {
        (load_json(input)?, Vec::new())
    };

    let records = process_entries(&entries, &PipelineOptions::for_url(url));
    Ok(build_event(records, event_type, &headers))
}
