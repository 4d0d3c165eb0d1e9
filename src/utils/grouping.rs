use crate::models::{Division, Group, Record};
use crate::utils::dedupe::dedupe;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Name fragments that belong to a different event listed on the same page
pub const DEFAULT_CONTAMINATION_INDICATORS: &[&str] = &[
    "grand prix",
    "gp",
    "las vegas",
    "miami",
    "monaco",
    "silverstone",
    "spa",
    "monza",
];

/// Split at `len / 2`; with an odd count the first group is the smaller one.
pub fn even_split(records: Vec<Record>, first_label: &str, second_label: &str) -> [Group; 2] {
    let mut first = records;
    let second = first.split_off(first.len() / 2);
    info!(
        "Conference split: {} {} / {} {}",
        first.len(),
        first_label,
        second.len(),
        second_label
    );
    [
        Group::new(first_label, first),
        Group::new(second_label, second),
    ]
}

/// Conference and division name out of a page header such as
/// "NFL 2025/26 - NFC East". Only the part after the last " - " is used.
pub fn parse_division_header(header: &str) -> (String, String) {
    let label = header.rsplit(" - ").next().unwrap_or(header).trim();
    let mut parts = label.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(conference), Some(_)) => {
            let division = label[conference.len()..].split_whitespace().collect::<Vec<_>>();
            (conference.to_string(), division.join(" "))
        }
        _ => (label.to_string(), "Unknown".to_string()),
    }
}

/// Divisions built from positional slices, plus whatever could not be placed
#[derive(Debug, Clone, Default, Serialize)]
pub struct DivisionGrouping {
    pub divisions: Vec<Division>,
    pub unassigned: Vec<Record>,
}

/// Assign contiguous slices of `len / k` records to each of the `k` headers.
/// The last division takes everything left over; divisions that end up
/// empty are left out.
pub fn split_divisions(records: Vec<Record>, headers: &[String]) -> DivisionGrouping {
    if headers.is_empty() {
        if !records.is_empty() {
            warn!(
                "No division headers found, {} records left unassigned",
                records.len()
            );
        }
        return DivisionGrouping {
            divisions: Vec::new(),
            unassigned: records,
        };
    }

    let per_division = records.len() / headers.len();
    let mut remaining = records.into_iter();
    let mut divisions = Vec::new();

    for (i, header) in headers.iter().enumerate() {
        let slice: Vec<Record> = if i + 1 == headers.len() {
            remaining.by_ref().collect()
        } else {
            remaining.by_ref().take(per_division).collect()
        };

        if slice.is_empty() {
            debug!("Division '{}' got no records, omitting", header);
            continue;
        }

        let (conference, division) = parse_division_header(header);
        divisions.push(Division {
            conference,
            division,
            records: slice,
        });
    }

    info!(
        "Division split: {} divisions from {} headers",
        divisions.len(),
        headers.len()
    );
    DivisionGrouping {
        divisions,
        unassigned: Vec::new(),
    }
}

/// Drops entries whose names reveal they belong to another event
#[derive(Debug, Clone)]
pub struct ContaminationFilter {
    indicators: Vec<String>,
}

impl ContaminationFilter {
    pub fn new<I, S>(indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            indicators: indicators
                .into_iter()
                .map(|s| s.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whole-word match, so "spa" does not hit "Gasparro".
    pub fn matches(&self, name: &str) -> bool {
        let padded = format!(" {} ", name.split_whitespace().collect::<Vec<_>>().join(" "))
            .to_lowercase();
        self.indicators
            .iter()
            .any(|indicator| padded.contains(&format!(" {} ", indicator)))
    }
}

impl Default for ContaminationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAMINATION_INDICATORS)
    }
}

/// Per-line groups sharing one roster
#[derive(Debug, Clone, Default, Serialize)]
pub struct BettingLineGrouping {
    pub lines: Vec<Group>,
    /// Distinct names dropped by the contamination filter
    pub excluded: Vec<String>,
    /// Records dropped by the contamination filter, across all lines
    pub excluded_count: usize,
}

impl BettingLineGrouping {
    pub fn line(&self, label: &str) -> Option<&Group> {
        self.lines.iter().find(|g| g.label == label)
    }
}

/// Line up several betting markets on one roster.
///
/// The roster is every name seen on any line, in first-seen order. Each
/// output line lists the whole roster in that order; names the line has no
/// price for get a placeholder record. Contaminated names are removed from
/// every line and reported in the result.
pub fn group_betting_lines(lines: Vec<Group>, filter: &ContaminationFilter) -> BettingLineGrouping {
    let mut excluded = Vec::new();
    let mut excluded_seen = HashSet::new();
    let mut excluded_count = 0;
    let mut roster: Vec<String> = Vec::new();
    let mut roster_seen = HashSet::new();
    let mut priced: Vec<(String, HashMap<String, Record>)> = Vec::with_capacity(lines.len());

    for line in lines {
        let mut by_name = HashMap::new();
        for record in dedupe(line.records) {
            if filter.matches(&record.name) {
                excluded_count += 1;
                if excluded_seen.insert(record.name.clone()) {
                    excluded.push(record.name.clone());
                }
                continue;
            }
            if roster_seen.insert(record.name.clone()) {
                roster.push(record.name.clone());
            }
            by_name.insert(record.name.clone(), record);
        }
        priced.push((line.label, by_name));
    }

    if excluded_count > 0 {
        warn!(
            "Excluded {} entries from another event: {:?}",
            excluded_count, excluded
        );
    }

    let lines = priced
        .into_iter()
        .map(|(label, mut by_name)| {
            let records: Vec<Record> = roster
                .iter()
                .map(|name| {
                    by_name.remove(name).unwrap_or_else(|| {
                        debug!("{} has no odds for {}, adding placeholder", name, label);
                        Record::placeholder(name.clone())
                    })
                })
                .collect();
            info!("Created {} line with {} entries", label, records.len());
            Group::new(label, records)
        })
        .collect();

    BettingLineGrouping {
        lines,
        excluded,
        excluded_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::odds::transform_odds;

    fn teams(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| Record::new(format!("Team {}", i), transform_odds("+1000"), "+1000"))
            .collect()
    }

    #[test]
    fn test_even_split_sizes() {
        let [nfc, afc] = even_split(teams(32), "NFC", "AFC");
        assert_eq!((nfc.len(), afc.len()), (16, 16));
        assert_eq!(nfc.label, "NFC");

        let [first, second] = even_split(teams(31), "NFC", "AFC");
        assert_eq!((first.len(), second.len()), (15, 16));
        assert_eq!(first.records[0].name, "Team 0");
        assert_eq!(second.records[0].name, "Team 15");
    }

    #[test]
    fn test_even_split_empty() {
        let [first, second] = even_split(Vec::new(), "NFC", "AFC");
        assert!(first.is_empty() && second.is_empty());
    }

    #[test]
    fn test_parse_division_header() {
        assert_eq!(
            parse_division_header("NFL 2025/26 - NFC East"),
            ("NFC".to_string(), "East".to_string())
        );
        assert_eq!(
            parse_division_header("AL Central Division"),
            ("AL".to_string(), "Central Division".to_string())
        );
        assert_eq!(
            parse_division_header("Atlantic"),
            ("Atlantic".to_string(), "Unknown".to_string())
        );
    }

    #[test]
    fn test_split_divisions_even() {
        let headers: Vec<String> = ["NFC East", "NFC North", "AFC East", "AFC West"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let grouping = split_divisions(teams(16), &headers);
        assert_eq!(grouping.divisions.len(), 4);
        assert!(grouping.unassigned.is_empty());
        assert!(grouping.divisions.iter().all(|d| d.records.len() == 4));
        assert_eq!(grouping.divisions[3].conference, "AFC");
        assert_eq!(grouping.divisions[3].division, "West");
        assert_eq!(grouping.divisions[3].records[0].name, "Team 12");
    }

    #[test]
    fn test_split_divisions_last_absorbs_remainder() {
        let headers: Vec<String> = vec!["NFC East".into(), "NFC West".into(), "AFC East".into()];
        let grouping = split_divisions(teams(11), &headers);
        let sizes: Vec<_> = grouping.divisions.iter().map(|d| d.records.len()).collect();
        assert_eq!(sizes, [3, 3, 5]);
    }

    #[test]
    fn test_split_divisions_omits_empty() {
        let headers: Vec<String> = vec!["NFC East".into(), "NFC West".into(), "AFC East".into()];
        let grouping = split_divisions(teams(2), &headers);
        assert_eq!(grouping.divisions.len(), 1);
        assert_eq!(grouping.divisions[0].division, "East");
        assert_eq!(grouping.divisions[0].records.len(), 2);
    }

    #[test]
    fn test_split_divisions_without_headers() {
        let grouping = split_divisions(teams(5), &[]);
        assert!(grouping.divisions.is_empty());
        assert_eq!(grouping.unassigned.len(), 5);
    }

    #[test]
    fn test_contamination_filter_whole_words() {
        let filter = ContaminationFilter::default();
        assert!(filter.matches("Las Vegas GP"));
        assert!(filter.matches("Monaco"));
        assert!(!filter.matches("Gasparro Rossi"));
        assert!(!filter.matches("Spain Smith"));
    }

    #[test]
    fn test_betting_lines_roster_completeness() {
        let roster: Vec<Record> = (0..10)
            .map(|i| Record::new(format!("Golfer {}", i), transform_odds("+2000"), "+2000"))
            .collect();
        let elsewhere: Vec<Record> = roster[..9].to_vec();

        let grouping = group_betting_lines(
            vec![
                Group::new("Winner", roster.clone()),
                Group::new("Top 5", elsewhere.clone()),
                Group::new("Top 10", elsewhere),
            ],
            &ContaminationFilter::default(),
        );

        assert_eq!(grouping.lines.len(), 3);
        for label in ["Winner", "Top 5", "Top 10"] {
            assert_eq!(grouping.line(label).unwrap().len(), 10);
        }
        for label in ["Top 5", "Top 10"] {
            let e = grouping
                .line(label)
                .unwrap()
                .records
                .iter()
                .find(|r| r.name == "Golfer 9")
                .unwrap();
            assert!(!e.has_odds());
            assert!(e.original_odds.is_empty());
        }
        assert!(grouping.line("Winner").unwrap().records[9].has_odds());
        assert_eq!(grouping.excluded_count, 0);
    }

    #[test]
    fn test_betting_lines_roster_order_and_late_names() {
        let grouping = group_betting_lines(
            vec![
                Group::new("Winner", vec![Record::placeholder("A"), Record::placeholder("B")]),
                Group::new("Top 2", vec![Record::new("C", transform_odds("+150"), "+150")]),
            ],
            &ContaminationFilter::default(),
        );
        let winner: Vec<_> = grouping.lines[0].records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(winner, ["A", "B", "C"]);
        assert!(grouping.lines[1].records[2].has_odds());
    }

    #[test]
    fn test_betting_lines_exclusions_are_counted() {
        let line = vec![
            Record::new("Lando Norris", transform_odds("+300"), "+300"),
            Record::new("Las Vegas GP", transform_odds("+100"), "+100"),
        ];
        let grouping = group_betting_lines(
            vec![
                Group::new("Winner", line.clone()),
                Group::new("Top 2", line),
            ],
            &ContaminationFilter::default(),
        );
        assert_eq!(grouping.excluded, ["Las Vegas GP"]);
        assert_eq!(grouping.excluded_count, 2);
        assert!(grouping
            .lines
            .iter()
            .all(|g| g.records.iter().all(|r| r.name != "Las Vegas GP")));
    }
}
