use crate::models::Record;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where processed rosters live between the scrape and the submission.
pub trait OddsStore {
    fn put(&mut self, key: &str, records: Vec<Record>) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<Record>>>;
    fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OddsStore for MemoryStore {
    fn put(&mut self, key: &str, records: Vec<Record>) -> Result<()> {
        self.entries.insert(key.to_string(), records);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<Record>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// One pretty-printed `<key>.json` file per roster under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OddsStore for JsonFileStore {
    fn put(&mut self, key: &str, records: Vec<Record>) -> Result<()> {
        let json = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
        std::fs::write(self.path_for(key), json).context("Failed to write store file")?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<Record>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path).context("Failed to read store file")?;
        let records = serde_json::from_str(&json).context("Failed to deserialize records")?;
        Ok(Some(records))
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir).context("Failed to list store directory")? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(key) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(decode_key)
                {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// File-safe, reversible form of a store key. ASCII letters, digits and `-`
/// pass through; every other byte becomes `_XX` (hex), so distinct keys such
/// as URLs never share a file.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{:02X}", byte));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(encoded.len());
    let mut rest = encoded.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        if byte == b'_' {
            let hex = std::str::from_utf8(tail.get(..2)?).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(byte);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::odds::transform_odds;

    fn roster() -> Vec<Record> {
        vec![
            Record::new("Lando Norris", transform_odds("+650"), "+650"),
            Record::placeholder("Max Verstappen"),
        ]
    }

    fn exercise(store: &mut dyn OddsStore) {
        assert!(store.get("monaco").unwrap().is_none());
        store.put("monaco", roster()).unwrap();
        store.put("miami", Vec::new()).unwrap();
        assert_eq!(store.get("monaco").unwrap().unwrap(), roster());
        assert_eq!(store.keys().unwrap(), ["miami", "monaco"]);
    }

    #[test]
    fn test_memory_store() {
        exercise(&mut MemoryStore::new());
    }

    #[test]
    fn test_json_file_store() {
        let dir = std::env::temp_dir().join(format!("odds_relay_store_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = JsonFileStore::open(&dir).unwrap();
        exercise(&mut store);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_file_store_keeps_similar_keys_apart() {
        let dir = std::env::temp_dir().join(format!("odds_relay_keys_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut store = JsonFileStore::open(&dir).unwrap();

        let division = "https://sportsbook.draftkings.com/leagues/football/nfl?category=futures&subcategory=division-winner";
        let conference = "https://sportsbook.draftkings.com/leagues/football/nfl?category=futures&subcategory=conference-winner";
        store.put(division, roster()).unwrap();
        store.put(conference, Vec::new()).unwrap();
        store.put("a/b", vec![Record::placeholder("Slash")]).unwrap();
        store.put("a?b", vec![Record::placeholder("Query")]).unwrap();
        store.put("a_b", Vec::new()).unwrap();

        assert_eq!(store.get(division).unwrap().unwrap(), roster());
        assert_eq!(store.get(conference).unwrap().unwrap(), Vec::new());
        assert_eq!(store.get("a/b").unwrap().unwrap()[0].name, "Slash");
        assert_eq!(store.get("a?b").unwrap().unwrap()[0].name, "Query");
        assert_eq!(store.keys().unwrap().len(), 5);
        assert!(store.keys().unwrap().contains(&division.to_string()));
        assert_eq!(store.dir(), dir.as_path());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_key_encoding_round_trips() {
        for key in ["monaco", "a/b", "a_b", "Émile?x=1&y=2", ""] {
            assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
        }
        assert_ne!(encode_key("a/b"), encode_key("a?b"));
        assert_eq!(decode_key("bad_Z"), None);
    }
}
