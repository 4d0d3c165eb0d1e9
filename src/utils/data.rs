use crate::models::Record;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Save anything serializable as pretty JSON
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value).context("Failed to serialize data")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load JSON written by [`save_json`] (or by hand)
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to deserialize {}", path.display()))?;
    Ok(value)
}

/// Save records to CSV
pub fn save_records_to_csv(records: &[Record], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref()).context("Failed to create CSV file")?;

    writer.write_record(["Team", "Odds", "Original Odds"])?;
    for record in records {
        writer.write_record([
            record.name.as_str(),
            record.odds.to_string().as_str(),
            record.original_odds.as_str(),
        ])?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
