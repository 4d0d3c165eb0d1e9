use std::str::FromStr;
use tracing::debug;

/// Website copy that shows up in front of the entity name, checked in order
const NOISE_PREFIXES: &[&str] = &[
    "Finish",
    "To Finish",
    "To Win",
    "Winner",
    "Champion",
    "Race Winner",
    "AMRace Winner",
    "Top",
    "Place",
    "Position",
];

/// Website copy trailing the entity name. Two-word tokens come first so
/// "X To Finish" loses the whole phrase rather than just "Finish".
const NOISE_SUFFIXES: &[&str] = &["To Win", "To Finish", "Finish", "Winner", "Champion"];

/// Shortest cleaned name we trust before falling back to the original label
const MIN_CLEANED_LEN: usize = 2;

/// Active Formula 1 drivers, lowercase
const F1_DRIVERS: &[&str] = &[
    "lando norris",
    "max verstappen",
    "oscar piastri",
    "george russell",
    "charles leclerc",
    "lewis hamilton",
    "carlos sainz",
    "alexander albon",
    "andrea kimi antonelli",
    "isack hadjar",
    "fernando alonso",
    "sergio perez",
    "valtteri bottas",
    "esteban ocon",
    "pierre gasly",
    "yuki tsunoda",
    "kevin magnussen",
    "nico hulkenberg",
    "lance stroll",
    "logan sargeant",
];

/// Strip sportsbook noise from a scraped label.
///
/// Leading noise tokens are removed repeatedly until a pass removes nothing,
/// then trailing ones the same way. Tokens only match on word boundaries, so
/// "Topher" keeps its "Top". If less than two characters survive, the label
/// is returned trimmed and capitalized instead.
pub fn clean_name(label: &str) -> String {
    let collapsed = collapse_whitespace(label);
    let mut cleaned = collapsed.as_str();

    // Each pass shortens the string, so this terminates.
    while let Some(rest) = strip_noise_prefix(cleaned) {
        debug!("Stripped prefix from '{}' -> '{}'", label, rest);
        cleaned = rest;
    }
    while let Some(rest) = strip_noise_suffix(cleaned) {
        debug!("Stripped suffix from '{}' -> '{}'", label, rest);
        cleaned = rest;
    }

    if cleaned.chars().count() < MIN_CLEANED_LEN {
        if !label.trim().is_empty() {
            debug!("Cleaning '{}' left '{}', keeping original", label, cleaned);
        }
        return title_case(&collapsed);
    }

    cleaned.to_string()
}

fn strip_noise_prefix(name: &str) -> Option<&str> {
    NOISE_PREFIXES.iter().find_map(|token| {
        let head = name.get(..token.len())?;
        if !head.eq_ignore_ascii_case(token) {
            return None;
        }
        let rest = &name[token.len()..];
        if rest.is_empty() || rest.starts_with(' ') {
            Some(rest.trim_start())
        } else {
            None
        }
    })
}

fn strip_noise_suffix(name: &str) -> Option<&str> {
    NOISE_SUFFIXES.iter().find_map(|token| {
        let split = name.len().checked_sub(token.len())?;
        let tail = name.get(split..)?;
        if !tail.eq_ignore_ascii_case(token) {
            return None;
        }
        let rest = &name[..split];
        if rest.is_empty() || rest.ends_with(' ') {
            Some(rest.trim_end())
        } else {
            None
        }
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Capitalize the first letter of every whitespace-delimited word and
/// lowercase the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sport context for a scrape; decides which canonical roster applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Domain {
    MotorRacing,
    Golf,
    #[default]
    General,
}

impl FromStr for Domain {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "auto_racing" | "motor_racing" | "racing" | "f1" | "formula-1" | "formula 1" => {
                Domain::MotorRacing
            }
            "golf" => Domain::Golf,
            _ => Domain::General,
        })
    }
}

/// Fixed list of known entity names used to resolve name variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn for_domain(domain: Domain) -> Option<Self> {
        match domain {
            Domain::MotorRacing => Some(Self::new(F1_DRIVERS)),
            Domain::Golf | Domain::General => None,
        }
    }

    /// First canonical entry contained in `name`, ignoring case
    pub fn find(&self, name: &str) -> Option<&str> {
        let lowered = name.to_lowercase();
        self.entries
            .iter()
            .find(|entry| lowered.contains(entry.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render a cleaned name in Title Case, preferring the canonical roster form
/// when one of its entries appears in the name.
pub fn normalize_name(cleaned: &str, roster: Option<&Roster>) -> String {
    let mut name = normalize_once(cleaned, roster);
    // Upper-casing can spell a noise token out of non-ASCII letters
    // ("\u{FB01}nish" -> "FInish"), so clean again until nothing changes.
    for _ in 0..MAX_SETTLE_PASSES {
        let again = normalize_once(&clean_name(&name), roster);
        if again == name {
            break;
        }
        name = again;
    }
    name
}

const MAX_SETTLE_PASSES: usize = 8;

fn normalize_once(cleaned: &str, roster: Option<&Roster>) -> String {
    match roster.and_then(|r| r.find(cleaned)) {
        Some(canonical) => title_case(canonical),
        None => title_case(cleaned),
    }
}
