use serde::{Deserialize, Serialize};
use std::fmt;

/// A label/odds pair as it came off the page, before any cleanup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub label: String,
    pub odds_text: String,
}

impl RawEntry {
    pub fn new(label: impl Into<String>, odds_text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            odds_text: odds_text.into(),
        }
    }
}

/// Raw entries from one betting line of a multi-line event (e.g. "Top 5")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEntries {
    pub label: String,
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

/// Signed American odds after the discount/coarsen policy has been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OddsValue {
    pub sign: Sign,
    pub magnitude: u32,
}

impl OddsValue {
    /// Parse an already rendered value such as "+485" without transforming it.
    pub fn parse(text: &str) -> Option<Self> {
        let (sign, digits) = split_sign(text.trim())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let magnitude = digits.parse::<u32>().ok()?;
        Some(Self { sign, magnitude })
    }
}

impl fmt::Display for OddsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.sign {
            Sign::Plus => '+',
            Sign::Minus => '-',
        };
        write!(f, "{}{}", sign, self.magnitude)
    }
}

/// Split a leading sign off an odds string. Sportsbook pages often render the
/// minus as U+2212, which is accepted alongside '-'.
pub(crate) fn split_sign(text: &str) -> Option<(Sign, &str)> {
    if let Some(rest) = text.strip_prefix('+') {
        Some((Sign::Plus, rest))
    } else if let Some(rest) = text.strip_prefix('-') {
        Some((Sign::Minus, rest))
    } else {
        text.strip_prefix('\u{2212}').map(|rest| (Sign::Minus, rest))
    }
}

/// The price attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Price {
    Adjusted(OddsValue),
    /// Text that did not look like `[+-]<digits>`; kept verbatim.
    Unparsed(String),
    /// Entity known by name only
    #[default]
    Empty,
}

impl Price {
    pub fn is_empty(&self) -> bool {
        matches!(self, Price::Empty)
    }

    pub fn as_value(&self) -> Option<OddsValue> {
        match self {
            Price::Adjusted(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Adjusted(value) => write!(f, "{}", value),
            Price::Unparsed(text) => f.write_str(text),
            Price::Empty => Ok(()),
        }
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

impl From<String> for Price {
    fn from(text: String) -> Self {
        if text.is_empty() {
            Price::Empty
        } else if let Some(value) = OddsValue::parse(&text) {
            Price::Adjusted(value)
        } else {
            Price::Unparsed(text)
        }
    }
}

/// A cleaned, normalized entity with its adjusted price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "team")]
    pub name: String,
    pub odds: Price,
    #[serde(default)]
    pub original_odds: String,
}

impl Record {
    pub fn new(name: impl Into<String>, odds: Price, original_odds: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            odds,
            original_odds: original_odds.into(),
        }
    }

    /// Roster entry for an entity with no price on a given line
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, Price::Empty, "")
    }

    pub fn has_odds(&self) -> bool {
        !self.odds.is_empty()
    }
}

/// A labelled, ordered partition of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub label: String,
    pub records: Vec<Record>,
}

impl Group {
    pub fn new(label: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            label: label.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A division slice with its conference parsed out of the page header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub conference: String,
    pub division: String,
    #[serde(rename = "teams")]
    pub records: Vec<Record>,
}

/// Page layout of a futures market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Championship,
    Conference,
    Division,
}

impl std::str::FromStr for EventType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "championship" => Ok(EventType::Championship),
            "conference" => Ok(EventType::Conference),
            "division" => Ok(EventType::Division),
            other => anyhow::bail!("Unknown event type: {}", other),
        }
    }
}

/// Records of one event, shaped the way the page grouped them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ScrapedEvent {
    Championship {
        teams: Vec<Record>,
    },
    Conference {
        conferences: Vec<Group>,
    },
    Division {
        divisions: Vec<Division>,
        #[serde(default)]
        unassigned: Vec<Record>,
    },
}

impl ScrapedEvent {
    /// Every placed record in group order. Unassigned records are left out.
    pub fn records(&self) -> Vec<&Record> {
        match self {
            ScrapedEvent::Championship { teams } => teams.iter().collect(),
            ScrapedEvent::Conference { conferences } => {
                conferences.iter().flat_map(|g| g.records.iter()).collect()
            }
            ScrapedEvent::Division { divisions, .. } => {
                divisions.iter().flat_map(|d| d.records.iter()).collect()
            }
        }
    }

    pub fn team_count(&self) -> usize {
        self.records().len()
    }
}
