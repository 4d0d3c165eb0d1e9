use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use odds_relay::api::game_api::{GameApiClient, SubmissionResult};
use odds_relay::config::RelayConfig;
use odds_relay::ids::IdError;
use odds_relay::payload::{build_event_payload, build_line_payloads, EventPayload, SportConfig};
use odds_relay::scrapers::extract::DRAFTKINGS_HEADER_SELECTOR;
use odds_relay::scrapers::{default_strategies, extract_entries, extract_headers};
use odds_relay::store::{MemoryStore, OddsStore};
use odds_relay::tournament::TournamentType;
use odds_relay::{
    build_event, event_name, process_entries, process_lines, ContaminationFilter, EventType,
    LineEntries, PipelineOptions, RawEntry, ScrapedEvent, SequentialIdAssigner,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
struct AppState {
    store: Arc<RwLock<MemoryStore>>,
    game_api_base_url: String,
    /// Used when a payload request names no start id
    default_start_id: u32,
}

/// Error body: `{"success": false, "error": "..."}`
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Request failed: {:#}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", err),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({"success": false, "error": self.message})),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Odds for one event, given either as raw entries or as the saved page
#[derive(Debug, Deserialize)]
struct ProcessRequest {
    url: String,
    #[serde(default)]
    event_type: EventType,
    #[serde(default)]
    entries: Option<Vec<RawEntry>>,
    #[serde(default)]
    html: Option<String>,
    /// Division titles; read from the page when `html` is given
    #[serde(default)]
    headers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ProcessResponse {
    success: bool,
    url: String,
    event_type: EventType,
    total_teams: usize,
    data: ScrapedEvent,
}

#[derive(Debug, Deserialize)]
struct PayloadRequest {
    #[serde(flatten)]
    odds: ProcessRequest,
    #[serde(default)]
    start_id: Option<u32>,
    #[serde(default)]
    sport_config: SportConfig,
}

#[derive(Debug, Serialize)]
struct PayloadStats {
    total_teams: usize,
    /// `None` when no ids were issued
    id_range: Option<String>,
}

#[derive(Debug, Serialize)]
struct PayloadResponse {
    success: bool,
    url: String,
    start_id: u32,
    #[serde(flatten)]
    payload: EventPayload,
    scraped_data: ScrapedEvent,
    stats: PayloadStats,
}

#[derive(Debug, Deserialize)]
struct MultiLineRequest {
    url: String,
    lines: Vec<LineEntries>,
    #[serde(default)]
    start_id: Option<u32>,
    #[serde(default)]
    sport_config: SportConfig,
}

#[derive(Debug, Serialize)]
struct MultiLineResponse {
    success: bool,
    url: String,
    start_id: u32,
    tournament_type: TournamentType,
    tournaments: Vec<EventPayload>,
    total_tournaments: usize,
    excluded: Vec<String>,
    /// Usual lines for this kind of event that the request left out
    missing_lines: Vec<&'static str>,
    stats: PayloadStats,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    tournaments: Vec<EventPayload>,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    success: bool,
    results: Vec<SubmissionResult>,
    total_submitted: usize,
    total_failed: usize,
}

#[derive(Debug, Serialize)]
struct StoredEvent {
    url: String,
    total_teams: usize,
}

#[derive(Debug, Serialize)]
struct StoredResponse {
    success: bool,
    events: Vec<StoredEvent>,
}

fn id_range(start_id: u32, ids: &SequentialIdAssigner) -> Option<String> {
    (ids.current() >= start_id).then(|| format!("{} - {}", start_id, ids.current()))
}

/// Run the pipeline over the request's entries and remember the records
/// under the request URL.
async fn process_request(state: &AppState, request: ProcessRequest) -> Result<ScrapedEvent, ApiError> {
    if request.url.trim().is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }

    let (entries, headers) = match (request.entries, request.html) {
        (Some(entries), _) => (entries, request.headers),
        (None, Some(html)) => {
            let entries = extract_entries(&html, &default_strategies())?.entries();
            let headers = if request.headers.is_empty() {
                extract_headers(&html, DRAFTKINGS_HEADER_SELECTOR)?
            } else {
                request.headers
            };
            (entries, headers)
        }
        (None, None) => {
            let stored = state.store.read().await.get(&request.url)?;
            let Some(records) = stored else {
                return Err(ApiError::bad_request("Either entries or html is required"));
            };
            return Ok(build_event(records, request.event_type, &request.headers));
        }
    };

    if entries.is_empty() {
        return Err(ApiError::bad_request("No odds found"));
    }

    let records = process_entries(&entries, &PipelineOptions::for_url(&request.url));
    state
        .store
        .write()
        .await
        .put(&request.url, records.clone())?;
    Ok(build_event(records, request.event_type, &headers))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn process(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<ProcessResponse> {
    let url = request.url.clone();
    let event_type = request.event_type;
    let data = process_request(&state, request).await?;
    info!("Processed {} teams for {}", data.team_count(), url);

    Ok(Json(ProcessResponse {
        success: true,
        url,
        event_type,
        total_teams: data.team_count(),
        data,
    }))
}

async fn generate_payloads(
    State(state): State<AppState>,
    Json(request): Json<PayloadRequest>,
) -> ApiResult<PayloadResponse> {
    // Reject a bad start id before doing any work
    let start_id = request.start_id.unwrap_or(state.default_start_id);
    let mut ids = SequentialIdAssigner::new(start_id)?;
    let url = request.odds.url.clone();
    info!("Generating payloads for: {} with start_id: {}", url, start_id);

    let scraped = process_request(&state, request.odds).await?;
    let name = event_name(&url, &request.sport_config.description);
    let payload = build_event_payload(
        &name,
        scraped.records(),
        &request.sport_config,
        &mut ids,
        chrono::Local::now().naive_local(),
    )?;

    Ok(Json(PayloadResponse {
        success: true,
        url,
        start_id,
        stats: PayloadStats {
            total_teams: scraped.team_count(),
            id_range: id_range(start_id, &ids),
        },
        payload,
        scraped_data: scraped,
    }))
}

async fn generate_multi_line_payloads(
    State(state): State<AppState>,
    Json(request): Json<MultiLineRequest>,
) -> ApiResult<MultiLineResponse> {
    let start_id = request.start_id.unwrap_or(state.default_start_id);
    let mut ids = SequentialIdAssigner::new(start_id)?;
    if request.url.trim().is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }
    if request.lines.is_empty() {
        return Err(ApiError::bad_request("No betting lines given"));
    }
    info!(
        "Generating multi-line payloads for: {} with start_id: {}",
        request.url, start_id
    );
    let tournament_type = TournamentType::detect(&request.url);
    let missing_lines = tournament_type.missing_lines(request.lines.iter().map(|l| l.label.as_str()));
    if !missing_lines.is_empty() {
        warn!("No odds given for betting lines: {:?}", missing_lines);
    }

    let grouping = process_lines(
        request.lines,
        &PipelineOptions::for_url(&request.url),
        &ContaminationFilter::default(),
    );
    let name = event_name(&request.url, &request.sport_config.description);
    let tournaments = build_line_payloads(
        &name,
        &grouping,
        &request.sport_config,
        &mut ids,
        chrono::Local::now().naive_local(),
    )?;
    let total_teams = tournaments
        .iter()
        .map(|t| t.odds_submission_payload.len())
        .sum();

    Ok(Json(MultiLineResponse {
        success: true,
        tournament_type,
        url: request.url,
        start_id,
        total_tournaments: tournaments.len(),
        tournaments,
        excluded: grouping.excluded,
        missing_lines,
        stats: PayloadStats {
            total_teams,
            id_range: id_range(start_id, &ids),
        },
    }))
}

/// Events processed so far, like checking for existing odds before a
/// second submission
async fn stored(State(state): State<AppState>) -> ApiResult<StoredResponse> {
    let store = state.store.read().await;
    let mut events = Vec::new();
    for url in store.keys()? {
        let total_teams = store.get(&url)?.map_or(0, |records| records.len());
        events.push(StoredEvent { url, total_teams });
    }
    Ok(Json(StoredResponse {
        success: true,
        events,
    }))
}

async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<SubmitResponse> {
    if request.tournaments.is_empty() {
        return Err(ApiError::bad_request("Tournaments list is required"));
    }
    info!("Submitting {} tournaments", request.tournaments.len());

    let client = GameApiClient::new(&state.game_api_base_url)?;
    let mut results = Vec::with_capacity(request.tournaments.len());
    for tournament in &request.tournaments {
        results.push(client.submit(tournament).await);
    }
    let total_failed = results.iter().filter(|r| !r.success).count();

    Ok(Json(SubmitResponse {
        success: total_failed == 0,
        total_submitted: results.len() - total_failed,
        total_failed,
        results,
    }))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/process", post(process))
        .route("/api/generate-payloads", post(generate_payloads))
        .route(
            "/api/generate-multi-line-payloads",
            post(generate_multi_line_payloads),
        )
        .route("/api/stored", get(stored))
        .route("/api/submit", post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = RelayConfig::from_env()?;
    let state = AppState {
        store: Arc::new(RwLock::new(MemoryStore::new())),
        game_api_base_url: config.game_api_base_url,
        default_start_id: config.start_id,
    };

    println!("\nStarting odds relay at http://{}", config.bind_addr);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
