pub mod api;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use models::*;
pub use scrapers::*;
pub use utils::*;

use tracing::info;
use utils::grouping::BettingLineGrouping;
use utils::tournament::{detect_tournament_name, grand_prix_name, TournamentType};

/// Conference labels for an evenly split futures board
pub const CONFERENCE_LABELS: (&str, &str) = ("NFC", "AFC");

/// Explicit knobs for one pass of the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub roster: Option<Roster>,
}

impl PipelineOptions {
    pub fn for_domain(domain: Domain) -> Self {
        Self {
            roster: Roster::for_domain(domain),
        }
    }

    /// Options for the event behind a sportsbook URL
    pub fn for_url(url: &str) -> Self {
        Self::for_domain(TournamentType::detect(url).domain())
    }
}

/// Turn one raw entry into a record. Never fails: bad odds stay as text.
pub fn process_entry(entry: &RawEntry, options: &PipelineOptions) -> Record {
    let cleaned = clean_name(&entry.label);
    let name = normalize_name(&cleaned, options.roster.as_ref());
    let odds = transform_odds(&entry.odds_text);
    Record::new(name, odds, entry.odds_text.trim())
}

/// Clean, normalize and price every entry, then keep the first record for
/// each name.
pub fn process_entries(entries: &[RawEntry], options: &PipelineOptions) -> Vec<Record> {
    let records: Vec<Record> = entries
        .iter()
        .map(|entry| process_entry(entry, options))
        .collect();
    let unique = utils::dedupe::dedupe(records);
    info!(
        "Processed {} raw entries into {} records",
        entries.len(),
        unique.len()
    );
    unique
}

/// Shape deduplicated records the way the event's page groups them.
/// `headers` are the division titles and only matter for division events.
pub fn build_event(records: Vec<Record>, event_type: EventType, headers: &[String]) -> ScrapedEvent {
    match event_type {
        EventType::Championship => ScrapedEvent::Championship { teams: records },
        EventType::Conference => {
            let (first, second) = CONFERENCE_LABELS;
            ScrapedEvent::Conference {
                conferences: even_split(records, first, second).into(),
            }
        }
        EventType::Division => {
            let grouping = split_divisions(records, headers);
            ScrapedEvent::Division {
                divisions: grouping.divisions,
                unassigned: grouping.unassigned,
            }
        }
    }
}

/// Process each betting line on its own, then align the lines so every
/// competitor appears in each of them.
pub fn process_lines(
    lines: Vec<LineEntries>,
    options: &PipelineOptions,
    filter: &ContaminationFilter,
) -> BettingLineGrouping {
    let groups = lines
        .into_iter()
        .map(|line| Group::new(line.label, process_entries(&line.entries, options)))
        .collect();
    group_betting_lines(groups, filter)
}

/// Display name for the event behind `url`. Racing events are named after
/// the race when the venue is known.
pub fn event_name(url: &str, description: &str) -> String {
    let name = detect_tournament_name(url, description);
    match TournamentType::detect(url) {
        TournamentType::AutoRacing => grand_prix_name(url, &name),
        TournamentType::Golf | TournamentType::Championship => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<RawEntry> {
        vec![
            RawEntry::new("AMRace Winner Max Verstappen", "+200"),
            RawEntry::new("Finish Lando Norris", "+650"),
            RawEntry::new("Max Verstappen", "+210"),
            RawEntry::new("Oscar Piastri", "SUSP"),
            RawEntry::new("Winner", "+30000"),
        ]
    }

    #[test]
    fn test_process_entries() {
        let records = process_entries(&entries(), &PipelineOptions::for_domain(Domain::MotorRacing));

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Max Verstappen", "Lando Norris", "Oscar Piastri", "Winner"]);
        assert_eq!(records[0].odds.to_string(), "+150");
        assert_eq!(records[1].odds.to_string(), "+485");
        assert_eq!(records[1].original_odds, "+650");
        assert_eq!(records[2].odds, Price::Unparsed("SUSP".to_string()));
        assert_eq!(records[3].odds.to_string(), "+20000");
    }

    #[test]
    fn test_every_entry_yields_a_record() {
        let options = PipelineOptions::default();
        for entry in entries() {
            let record = process_entry(&entry, &options);
            assert!(!record.name.is_empty());
        }
    }

    #[test]
    fn test_process_entries_is_deterministic() {
        let options = PipelineOptions::for_url("https://sportsbook.draftkings.com/leagues/motorsports/f1");
        assert_eq!(
            process_entries(&entries(), &options),
            process_entries(&entries(), &options)
        );
    }

    #[test]
    fn test_build_event_conference() {
        let entries: Vec<RawEntry> = (0..32)
            .map(|i| RawEntry::new(format!("Team {}", i), "+1000"))
            .collect();
        let records = process_entries(&entries, &PipelineOptions::default());
        let event = build_event(records, EventType::Conference, &[]);
        match &event {
            ScrapedEvent::Conference { conferences } => {
                assert_eq!(conferences[0].label, "NFC");
                assert_eq!(conferences[0].len(), 16);
                assert_eq!(conferences[1].len(), 16);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(event.team_count(), 32);
    }

    #[test]
    fn test_process_lines_fills_missing_entries() {
        let lines = vec![
            LineEntries {
                label: "Winner".to_string(),
                entries: vec![
                    RawEntry::new("Scottie Scheffler", "+400"),
                    RawEntry::new("Rory McIlroy", "+800"),
                ],
            },
            LineEntries {
                label: "Top 5".to_string(),
                entries: vec![RawEntry::new("Scottie Scheffler", "-150")],
            },
        ];
        let grouping = process_lines(lines, &PipelineOptions::default(), &ContaminationFilter::default());

        let top5 = grouping.line("Top 5").unwrap();
        assert_eq!(top5.len(), 2);
        assert_eq!(top5.records[0].name, "Scottie Scheffler");
        assert!(top5.records[0].has_odds());
        assert_eq!(top5.records[1].name, "Rory Mcilroy");
        assert!(!top5.records[1].has_odds());
    }

    #[test]
    fn test_pipeline_items_reachable_from_crate_root() {
        let filter = crate::ContaminationFilter::default();
        assert!(filter.matches("Las Vegas Grand Prix"));
        assert_eq!(crate::clean_name("Winner Bob Smith"), "Bob Smith");
        assert_eq!(crate::normalize_name("bob smith", None::<&crate::Roster>), "Bob Smith");
        assert_eq!(crate::transform_odds("+650").to_string(), "+485");
        assert_eq!(crate::even_split(Vec::new(), "NFC", "AFC")[1].label, "AFC");
        assert!(crate::split_divisions(Vec::new(), &[]).divisions.is_empty());
        assert!(crate::group_betting_lines(Vec::new(), &filter).lines.is_empty());
        assert_eq!(crate::Domain::default(), crate::Domain::General);
    }

    #[test]
    fn test_event_name() {
        assert_eq!(
            event_name("https://sportsbook.draftkings.com/leagues/motorsports/f1/monaco", ""),
            "Monaco Grand Prix"
        );
        assert_eq!(event_name("https://example.com/weekly", "Weekly Golf"), "Weekly Golf");
        assert_eq!(event_name("https://example.com/weekly", ""), "Tournament");
    }

    #[test]
    fn test_build_event_division() {
        let entries: Vec<RawEntry> = (0..8)
            .map(|i| RawEntry::new(format!("Team {}", i), "+400"))
            .collect();
        let records = process_entries(&entries, &PipelineOptions::default());
        let headers = vec!["NFL - NFC East".to_string(), "NFL - AFC North".to_string()];
        match build_event(records, EventType::Division, &headers) {
            ScrapedEvent::Division {
                divisions,
                unassigned,
            } => {
                assert_eq!(divisions.len(), 2);
                assert_eq!(divisions[1].conference, "AFC");
                assert_eq!(divisions[1].division, "North");
                assert!(unassigned.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
