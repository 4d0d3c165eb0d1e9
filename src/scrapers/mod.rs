pub mod extract;

pub use extract::{default_strategies, extract_entries, extract_headers, Extraction, ExtractionStrategy};
