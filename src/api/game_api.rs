use crate::utils::payload::{EventPayload, GamePayload, GameValue};
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};

pub const GAME_API_BASE_URL: &str = "https://clmapi.sportsfanwagers.com/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of submitting one event (game + odds)
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub line_name: Option<String>,
    pub success: bool,
    pub game_id: Option<i64>,
    pub odds_count: usize,
    pub error: Option<String>,
}

/// Client for the game-management API that receives the relayed odds
pub struct GameApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl GameApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .context("Failed to build HTTP client")?,
        })
    }

    /// Create the game and return its id
    pub async fn insert_game(&self, game: &GamePayload) -> Result<i64> {
        let url = format!("{}/Game/InsertGame", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(game)
            .send()
            .await
            .context("Failed to send game to the game API")?;

        if !response.status().is_success() {
            anyhow::bail!("Game creation failed: {}", response.status());
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse game creation response")?;
        game_id_from_response(&body)
            .with_context(|| format!("No game id in game creation response: {}", body))
    }

    /// Attach odds rows to an existing game
    pub async fn insert_game_values(&self, game_id: i64, values: &[GameValue]) -> Result<()> {
        let url = format!("{}/Game/InsertGameValuesTNT", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("idGame", game_id)])
            .json(values)
            .send()
            .await
            .context("Failed to send odds to the game API")?;

        if !response.status().is_success() {
            anyhow::bail!("Odds submission failed: {}", response.status());
        }
        Ok(())
    }

    /// Create the game, then submit its odds. Failures are reported in the
    /// result so one bad event does not stop a batch.
    pub async fn submit(&self, payload: &EventPayload) -> SubmissionResult {
        let mut result = SubmissionResult {
            line_name: payload.line_name.clone(),
            success: false,
            game_id: None,
            odds_count: payload.odds_submission_payload.len(),
            error: None,
        };

        let name = &payload.game_creation_payload.home_team;
        match self.insert_game(&payload.game_creation_payload).await {
            Ok(game_id) => {
                info!("Game created for {} with ID: {}", name, game_id);
                result.game_id = Some(game_id);
                match self
                    .insert_game_values(game_id, &payload.odds_submission_payload)
                    .await
                {
                    Ok(()) => {
                        info!("Odds submitted successfully for {}", name);
                        result.success = true;
                    }
                    Err(e) => {
                        error!("Odds submission failed for {}: {:#}", name, e);
                        result.error = Some(format!("{:#}", e));
                    }
                }
            }
            Err(e) => {
                error!("Game creation failed for {}: {:#}", name, e);
                result.error = Some(format!("{:#}", e));
            }
        }

        result
    }
}

/// The API has answered with `{"idGame": n}`, `{"IdGame": n}`, `{"id": n}`
/// and a bare number over time.
fn game_id_from_response(body: &Value) -> Option<i64> {
    match body {
        Value::Object(map) => ["idGame", "IdGame", "id"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(game_id_from_response),
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::utils::ids::SequentialIdAssigner;
    use crate::utils::odds::transform_odds;
    use crate::utils::payload::{build_event_payload, SportConfig};
    use axum::{extract::Query, routing::post, Json, Router};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_game_id_from_response() {
        assert_eq!(game_id_from_response(&json!({"idGame": 42})), Some(42));
        assert_eq!(game_id_from_response(&json!({"IdGame": "43"})), Some(43));
        assert_eq!(game_id_from_response(&json!({"id": 44})), Some(44));
        assert_eq!(game_id_from_response(&json!(45)), Some(45));
        assert_eq!(game_id_from_response(&json!({"status": "ok"})), None);
    }

    fn payload() -> EventPayload {
        let mut ids = SequentialIdAssigner::new(1_000_000).unwrap();
        let records = vec![Record::new("Kansas City Chiefs", transform_odds("+650"), "+650")];
        let timestamp = NaiveDate::from_ymd_opt(2025, 9, 7)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        build_event_payload(
            "Super Bowl",
            &records,
            &SportConfig::default(),
            &mut ids,
            timestamp,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_submit_against_local_server() {
        let received: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();
        let games = received.clone();
        let values = received.clone();

        let app = Router::new()
            .route(
                "/api/Game/InsertGame",
                post(move |Json(body): Json<Value>| async move {
                    games.lock().unwrap().push(("game".to_string(), body));
                    Json(json!({"idGame": 777}))
                }),
            )
            .route(
                "/api/Game/InsertGameValuesTNT",
                post(
                    move |Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                        values
                            .lock()
                            .unwrap()
                            .push((query.get("idGame").cloned().unwrap_or_default(), body));
                        Json(json!(true))
                    },
                ),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = GameApiClient::new(&format!("http://{}/api", addr)).unwrap();
        let result = client.submit(&payload()).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.game_id, Some(777));
        assert_eq!(result.odds_count, 1);

        let received = received.lock().unwrap();
        assert_eq!(received[0].1["HomeTeam"], "Super Bowl");
        assert_eq!(received[1].0, "777");
        assert_eq!(received[1].1[0]["Odds"], "+485");
    }

    #[tokio::test]
    async fn test_submit_reports_failure() {
        // Nothing listens on this port once the listener is dropped.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GameApiClient::new(&format!("http://{}/api", addr)).unwrap();
        let result = client.submit(&payload()).await;
        assert!(!result.success);
        assert!(result.game_id.is_none());
        assert!(result.error.is_some());
    }
}
