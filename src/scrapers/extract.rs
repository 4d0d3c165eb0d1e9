use crate::models::RawEntry;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Header element DraftKings puts above each division / tournament block
pub const DRAFTKINGS_HEADER_SELECTOR: &str = "div.cb-title__simple-title.cb-title__nav-title";

/// A pair of selectors for entity labels and their odds, zipped in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStrategy {
    pub name: String,
    pub label_selector: String,
    pub odds_selector: String,
}

impl ExtractionStrategy {
    pub fn new(name: &str, label_selector: &str, odds_selector: &str) -> Self {
        Self {
            name: name.to_string(),
            label_selector: label_selector.to_string(),
            odds_selector: odds_selector.to_string(),
        }
    }
}

/// The DraftKings market-board layouts, most specific first
pub fn default_strategies() -> Vec<ExtractionStrategy> {
    vec![
        ExtractionStrategy::new(
            "market-board",
            r#"span[data-testid="button-title-market-board"]"#,
            r#"span[data-testid="button-odds-market-board"]"#,
        ),
        ExtractionStrategy::new(
            "button",
            r#"span[data-testid="button-title"]"#,
            r#"span[data-testid="button-odds"]"#,
        ),
        ExtractionStrategy::new(
            "any-market-board",
            r#"[data-testid="button-title-market-board"]"#,
            r#"[data-testid="button-odds-market-board"]"#,
        ),
    ]
}

/// Result of trying the strategies in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found {
        strategy: String,
        entries: Vec<RawEntry>,
    },
    /// No strategy matched both labels and odds
    Exhausted { tried: Vec<String> },
}

impl Extraction {
    pub fn entries(self) -> Vec<RawEntry> {
        match self {
            Extraction::Found { entries, .. } => entries,
            Extraction::Exhausted { .. } => Vec::new(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .ok()
        .with_context(|| format!("Invalid selector: {}", selector))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Odds text for one label: the odds element inside the smallest ancestor
/// that holds this label and no other. Empty when that ancestor has none.
fn paired_odds(label: ElementRef<'_>, labels: &Selector, odds: &Selector) -> String {
    for node in label.ancestors() {
        let Some(ancestor) = ElementRef::wrap(node) else {
            continue;
        };
        if ancestor.select(labels).nth(1).is_some() {
            break;
        }
        if let Some(odds_element) = ancestor.select(odds).next() {
            return element_text(odds_element);
        }
    }
    String::new()
}

/// Pull label/odds pairs out of a saved page. The first strategy that finds
/// both labels and odds wins. Each label is paired with the odds in its own
/// button; a label without one keeps an empty `odds_text`.
pub fn extract_entries(html: &str, strategies: &[ExtractionStrategy]) -> Result<Extraction> {
    let document = Html::parse_document(html);
    let mut tried = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        let labels = parse_selector(&strategy.label_selector)?;
        let odds = parse_selector(&strategy.odds_selector)?;

        let label_count = document.select(&labels).count();
        let odds_count = document.select(&odds).count();
        tried.push(strategy.name.clone());

        if label_count == 0 || odds_count == 0 {
            debug!(
                "Strategy '{}' found {} labels and {} odds",
                strategy.name, label_count, odds_count
            );
            continue;
        }

        let entries: Vec<RawEntry> = document
            .select(&labels)
            .map(|label| RawEntry {
                label: element_text(label),
                odds_text: paired_odds(label, &labels, &odds),
            })
            .collect();

        let unpriced = entries.iter().filter(|e| e.odds_text.is_empty()).count();
        if unpriced > 0 {
            warn!(
                "Strategy '{}' found {} labels without odds",
                strategy.name, unpriced
            );
        }
        info!(
            "Extracted {} entries using strategy '{}'",
            entries.len(),
            strategy.name
        );
        return Ok(Extraction::Found {
            strategy: strategy.name.clone(),
            entries,
        });
    }

    warn!("No strategy matched, tried {:?}", tried);
    Ok(Extraction::Exhausted { tried })
}

/// Header texts in page order, e.g. division titles
pub fn extract_headers(html: &str, selector: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = parse_selector(selector)?;
    Ok(document
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect())
}
