use crate::utils::names::Domain;
use serde::{Deserialize, Serialize};

const GOLF_PATTERNS: &[&str] = &[
    "golf",
    "pga",
    "masters",
    "us-open",
    "british-open",
    "pga-championship",
];

const RACING_PATTERNS: &[&str] = &["formula-1", "f1", "nascar", "indycar", "racing", "auto-racing"];

const TOURNAMENT_NAMES: &[(&str, &str)] = &[
    ("super-bowl", "Super Bowl"),
    ("heisman", "Heisman Trophy"),
    ("championship", "Championship"),
    ("playoff", "Playoffs"),
    ("futures", "Futures"),
    ("nfl", "NFL"),
    ("ncaa", "NCAA"),
    ("college", "College Football"),
    ("golf", "Golf Tournament"),
    ("pga", "PGA Tournament"),
    ("masters", "Masters Tournament"),
    ("formula-1", "Formula 1"),
    ("f1", "Formula 1"),
    ("nascar", "NASCAR"),
    ("indycar", "IndyCar"),
    ("racing", "Auto Racing"),
];

const GRAND_PRIX_NAMES: &[(&str, &str)] = &[
    ("monaco", "Monaco Grand Prix"),
    ("silverstone", "British Grand Prix"),
    ("spa", "Belgian Grand Prix"),
    ("monza", "Italian Grand Prix"),
    ("spain", "Spanish Grand Prix"),
    ("france", "French Grand Prix"),
    ("austria", "Austrian Grand Prix"),
    ("hungary", "Hungarian Grand Prix"),
    ("belgium", "Belgian Grand Prix"),
    ("netherlands", "Dutch Grand Prix"),
    ("singapore", "Singapore Grand Prix"),
    ("japan", "Japanese Grand Prix"),
    ("australia", "Australian Grand Prix"),
    ("bahrain", "Bahrain Grand Prix"),
    ("saudi", "Saudi Arabian Grand Prix"),
    ("qatar", "Qatar Grand Prix"),
    ("abu-dhabi", "Abu Dhabi Grand Prix"),
    ("miami", "Miami Grand Prix"),
    ("las-vegas", "Las Vegas Grand Prix"),
    ("brazil", "Brazilian Grand Prix"),
    ("mexico", "Mexican Grand Prix"),
    ("canada", "Canadian Grand Prix"),
    ("azerbaijan", "Azerbaijan Grand Prix"),
    ("china", "Chinese Grand Prix"),
    ("russia", "Russian Grand Prix"),
    ("portugal", "Portuguese Grand Prix"),
    ("turkey", "Turkish Grand Prix"),
    ("imola", "Emilia Romagna Grand Prix"),
    ("emilia", "Emilia Romagna Grand Prix"),
    ("romagna", "Emilia Romagna Grand Prix"),
];

const NASCAR_TRACKS: &[(&str, &str)] = &[
    ("daytona", "Daytona 500"),
    ("talladega", "Talladega Superspeedway"),
    ("bristol", "Bristol Motor Speedway"),
    ("martinsville", "Martinsville Speedway"),
    ("richmond", "Richmond Raceway"),
    ("charlotte", "Charlotte Motor Speedway"),
    ("texas", "Texas Motor Speedway"),
    ("phoenix", "Phoenix Raceway"),
    ("las-vegas", "Las Vegas Motor Speedway"),
    ("homestead", "Homestead-Miami Speedway"),
    ("atlanta", "Atlanta Motor Speedway"),
    ("dover", "Dover Motor Speedway"),
    ("kansas", "Kansas Speedway"),
    ("kentucky", "Kentucky Speedway"),
    ("chicagoland", "Chicagoland Speedway"),
    ("pocono", "Pocono Raceway"),
    ("watkins-glen", "Watkins Glen International"),
    ("sonoma", "Sonoma Raceway"),
    ("road-america", "Road America"),
    ("indy", "Indianapolis Motor Speedway"),
];

/// Description the game API gets when the caller supplied none of its own
pub const DEFAULT_DESCRIPTION: &str = "DraftKings Scraped Data";

/// How an event page is laid out and which markets it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    Golf,
    AutoRacing,
    #[default]
    Championship,
}

impl TournamentType {
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();
        if GOLF_PATTERNS.iter().any(|p| url.contains(p)) {
            TournamentType::Golf
        } else if RACING_PATTERNS.iter().any(|p| url.contains(p)) {
            TournamentType::AutoRacing
        } else {
            TournamentType::Championship
        }
    }

    pub fn default_lines(self) -> &'static [&'static str] {
        match self {
            TournamentType::Golf => &["Winner", "Top 5", "Top 10"],
            TournamentType::AutoRacing => &["Winner", "Top 2", "Top 4"],
            TournamentType::Championship => &["Winner"],
        }
    }

    /// Default lines with no entry in `present`, compared ignoring case
    pub fn missing_lines<'a>(self, present: impl IntoIterator<Item = &'a str>) -> Vec<&'static str> {
        let present: Vec<&str> = present.into_iter().map(str::trim).collect();
        self.default_lines()
            .iter()
            .copied()
            .filter(|line| !present.iter().any(|p| p.eq_ignore_ascii_case(line)))
            .collect()
    }

    pub fn domain(self) -> Domain {
        match self {
            TournamentType::Golf => Domain::Golf,
            TournamentType::AutoRacing => Domain::MotorRacing,
            TournamentType::Championship => Domain::General,
        }
    }
}

/// Event name from the URL, else the caller's description, else "Tournament"
pub fn detect_tournament_name(url: &str, description: &str) -> String {
    let url = url.to_lowercase();
    if let Some((_, name)) = TOURNAMENT_NAMES.iter().find(|(p, _)| url.contains(p)) {
        return name.to_string();
    }
    let description = description.trim();
    if !description.is_empty() && description != DEFAULT_DESCRIPTION {
        return description.to_string();
    }
    "Tournament".to_string()
}

/// Race name for motor-racing URLs (F1 venues first, then NASCAR tracks)
pub fn grand_prix_name(url: &str, fallback: &str) -> String {
    let url = url.to_lowercase();
    GRAND_PRIX_NAMES
        .iter()
        .chain(NASCAR_TRACKS)
        .find(|(p, _)| url.contains(p))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| fallback.to_string())
}
