use crate::models::Record;
use crate::utils::grouping::BettingLineGrouping;
use crate::utils::ids::{IdError, SequentialIdAssigner};
use crate::utils::tournament::DEFAULT_DESCRIPTION;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// League and game-type ids the game API files an event under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportConfig {
    #[serde(default = "default_id_league")]
    pub id_league: u32,
    #[serde(default = "default_id_game_type")]
    pub id_game_type: u32,
    #[serde(default = "default_id_user")]
    pub id_user: u32,
    #[serde(default)]
    pub description: String,
}

fn default_id_league() -> u32 {
    3101
}

fn default_id_game_type() -> u32 {
    1
}

fn default_id_user() -> u32 {
    360
}

impl Default for SportConfig {
    fn default() -> Self {
        Self {
            id_league: default_id_league(),
            id_game_type: default_id_game_type(),
            id_user: default_id_user(),
            description: String::new(),
        }
    }
}

/// One odds row for the game API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameValue {
    pub id: u32,
    pub team_name: String,
    pub odds: String,
}

/// Body of the game API's insert-game call. Field names (typos included)
/// are what the API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GamePayload {
    pub id_sport: String,
    pub id_league: u32,
    pub id_game_type: u32,
    pub game_date_time: String,
    pub visitor_number: u32,
    pub home_number: u32,
    pub visitor_team: String,
    pub home_team: String,
    pub visitor_score: u32,
    pub home_score: u32,
    pub visitor_pitcher: String,
    pub home_pitcher: String,
    pub normal_game: u32,
    pub game_stat: String,
    pub graded: bool,
    pub hookups: bool,
    pub local: bool,
    pub online: bool,
    pub short_game: bool,
    pub event_date: String,
    pub date_changed: bool,
    #[serde(rename = "YimeChanged")]
    pub time_changed: bool,
    pub pitcher_changed: u32,
    pub period: u32,
    pub parent_game: u32,
    pub graded_date: Option<String>,
    pub num_teams: usize,
    pub id_event: u32,
    pub family_game: u32,
    pub has_children: bool,
    pub id_team_visitor: u32,
    pub id_team_home: u32,
    pub id_banner_type: u32,
    pub description: String,
    pub accept_auto_changes: bool,
    pub id_user: u32,
    pub result: u32,
    pub tournament_type: u32,
    #[serde(rename = "TournamentPlacestoPaid")]
    pub tournament_places_to_paid: String,
}

impl GamePayload {
    /// Tournament-style game: both sides carry the event name.
    pub fn tournament(
        name: &str,
        description: &str,
        num_teams: usize,
        sport: &SportConfig,
        timestamp: NaiveDateTime,
    ) -> Self {
        let time = timestamp.format(TIMESTAMP_FORMAT).to_string();
        Self {
            id_sport: "TNT".to_string(),
            id_league: sport.id_league,
            id_game_type: sport.id_game_type,
            game_date_time: time.clone(),
            visitor_number: 1,
            home_number: 2,
            visitor_team: name.to_string(),
            home_team: name.to_string(),
            visitor_score: 0,
            home_score: 0,
            visitor_pitcher: String::new(),
            home_pitcher: String::new(),
            normal_game: 0,
            game_stat: "D".to_string(),
            graded: false,
            hookups: false,
            local: true,
            online: true,
            short_game: false,
            event_date: time,
            date_changed: false,
            time_changed: false,
            pitcher_changed: 0,
            period: 0,
            parent_game: 0,
            graded_date: None,
            num_teams,
            id_event: 0,
            family_game: 0,
            has_children: false,
            id_team_visitor: 0,
            id_team_home: 0,
            id_banner_type: 0,
            description: description.to_string(),
            accept_auto_changes: true,
            id_user: sport.id_user,
            result: 0,
            tournament_type: 1,
            tournament_places_to_paid: "1".to_string(),
        }
    }
}

/// Tag records with ids in order. Fails if the assigner runs out of range.
pub fn game_values<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    ids: &mut SequentialIdAssigner,
) -> Result<Vec<GameValue>, IdError> {
    records
        .into_iter()
        .map(|record| {
            Ok(GameValue {
                id: ids.next_id()?,
                team_name: record.name.clone(),
                odds: record.odds.to_string(),
            })
        })
        .collect()
}

/// Game plus odds rows for one event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub line_name: Option<String>,
    pub game_creation_payload: GamePayload,
    pub odds_submission_payload: Vec<GameValue>,
}

impl EventPayload {
    pub fn id_range(&self) -> Option<(u32, u32)> {
        let first = self.odds_submission_payload.first()?;
        let last = self.odds_submission_payload.last()?;
        Some((first.id, last.id))
    }
}

/// Payload for a single-market event named `event_name`.
pub fn build_event_payload<'a>(
    event_name: &str,
    records: impl IntoIterator<Item = &'a Record>,
    sport: &SportConfig,
    ids: &mut SequentialIdAssigner,
    timestamp: NaiveDateTime,
) -> Result<EventPayload, IdError> {
    let values = game_values(records, ids)?;
    let description = format!("{} - {}", event_name, DEFAULT_DESCRIPTION);
    let game = GamePayload::tournament(event_name, &description, values.len(), sport, timestamp);
    info!(
        "Built payload for {} with {} teams (ids up to {})",
        event_name,
        values.len(),
        ids.current()
    );
    Ok(EventPayload {
        line_name: None,
        game_creation_payload: game,
        odds_submission_payload: values,
    })
}

/// One payload per betting line, named "<event> - <line>". All lines draw
/// from the same assigner so ids never repeat within the pass. Lines with no
/// records are skipped.
pub fn build_line_payloads(
    event_name: &str,
    grouping: &BettingLineGrouping,
    sport: &SportConfig,
    ids: &mut SequentialIdAssigner,
    timestamp: NaiveDateTime,
) -> Result<Vec<EventPayload>, IdError> {
    let mut payloads = Vec::with_capacity(grouping.lines.len());

    for line in &grouping.lines {
        if line.is_empty() {
            warn!("No odds data for line: {}", line.label);
            continue;
        }
        let name = format!("{} - {}", event_name, line.label);
        let description = format!("{} {} - {}", event_name, line.label, DEFAULT_DESCRIPTION);
        let values = game_values(&line.records, ids)?;
        let game = GamePayload::tournament(&name, &description, values.len(), sport, timestamp);
        info!("Built {} payload with {} entries", name, values.len());
        payloads.push(EventPayload {
            line_name: Some(line.label.clone()),
            game_creation_payload: game,
            odds_submission_payload: values,
        });
    }

    Ok(payloads)
}
