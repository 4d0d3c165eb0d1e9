use crate::models::Record;
use std::collections::HashSet;
use tracing::{debug, info};

/// Outcome of a dedupe pass
#[derive(Debug, Clone, Default)]
pub struct DedupResult {
    pub retained: Vec<Record>,
    pub duplicates: Vec<Record>,
}

impl DedupResult {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
    }
}

/// Keep the first record for each normalized name, in input order.
/// Later records with the same name are dropped whatever their odds.
pub fn dedupe(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    partition_duplicates(records).retained
}

/// Same as [`dedupe`] but hands back the dropped records too.
pub fn partition_duplicates(records: impl IntoIterator<Item = Record>) -> DedupResult {
    let mut seen = HashSet::new();
    let mut result = DedupResult::default();

    for record in records {
        if seen.insert(record.name.clone()) {
            result.retained.push(record);
        } else {
            debug!("Skipping duplicate: {}", record.name);
            result.duplicates.push(record);
        }
    }

    if !result.is_clean() {
        info!(
            "Removed {} duplicate entries, {} unique",
            result.duplicates.len(),
            result.retained.len()
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::odds::transform_odds;

    fn record(name: &str, odds: &str) -> Record {
        Record::new(name, transform_odds(odds), odds)
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let records = vec![
            record("Lando Norris", "+650"),
            record("Max Verstappen", "+200"),
            record("Lando Norris", "+700"),
            record("Oscar Piastri", "+475"),
            record("Max Verstappen", "+210"),
        ];
        let unique = dedupe(records.clone());

        let names: Vec<_> = unique.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Lando Norris", "Max Verstappen", "Oscar Piastri"]);
        assert_eq!(unique[0].original_odds, "+650");
        assert_eq!(unique[1].original_odds, "+200");
        assert!(unique.len() <= records.len());
    }

    #[test]
    fn test_dedupe_is_case_sensitive() {
        let unique = dedupe(vec![record("Lando Norris", "+650"), record("lando norris", "+650")]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_partition_duplicates_reports_dropped() {
        let result = partition_duplicates(vec![
            record("A Team", "+100"),
            record("A Team", "+110"),
            Record::placeholder("B Team"),
        ]);
        assert_eq!(result.retained.len(), 2);
        assert_eq!(result.duplicates.len(), 1);
        assert_eq!(result.duplicates[0].original_odds, "+110");
        assert!(!result.retained[1].has_odds());
    }

    #[test]
    fn test_dedupe_is_deterministic() {
        let input: Vec<Record> = (0..50)
            .map(|i| record(&format!("Team {}", i % 17), &format!("+{}", 100 + i)))
            .collect();
        assert_eq!(dedupe(input.clone()), dedupe(input));
    }
}
