//! Whole-file JSON cache store
//!
//! The store is a single JSON document mapping cache keys to entries of the
//! form `{"data": <payload>, "ctime": <seconds since epoch>}`. Every save
//! rewrites the whole document via a sibling temporary file and an atomic
//! rename, so a reader never observes a truncated store and a crash
//! mid-write cannot destroy entries belonging to other keys.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when persisting a cache entry
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the store file failed
    #[error("cache store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the store document failed
    #[error("cache store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A well-formed entry read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The cached payload, exactly as fetched
    pub data: Value,
    /// Creation time in seconds since the Unix epoch (UTC)
    pub ctime: f64,
}

/// Durable mapping from cache key to the last successful payload
///
/// Reads are all-or-nothing per key: an entry missing `data`, holding a
/// `null` payload, or missing a numeric `ctime` is treated as absent, as is
/// an unreadable or unparseable store file. Corruption is logged and
/// recovered as a miss; it never reaches the caller as an error.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Path of the backing JSON document
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store backed by the given file path
    ///
    /// The file does not have to exist yet; it is created on the first
    /// successful [`insert`](Self::insert).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing store file
    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up the entry for `key`
    ///
    /// Returns `None` when the store file does not exist, cannot be parsed,
    /// the key is absent, or the entry is malformed. Malformed state is
    /// logged and never surfaces as an error.
    pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
        let document = self.load_document()?;
        let raw = match document.get(key) {
            Some(raw) => raw,
            None => {
                debug!(key, "cache miss: key not present");
                return None;
            }
        };

        match parse_entry(raw) {
            Some(entry) => Some(entry),
            None => {
                warn!(key, "cache entry is malformed; treating as a miss");
                None
            }
        }
    }

    /// Persists `data` under `key` with the given creation time
    ///
    /// Performs a read-modify-write of the whole document: entries for other
    /// keys are carried over untouched (even malformed ones, as raw JSON),
    /// only this key's entry is replaced. The document is written to a
    /// sibling temporary file and renamed into place.
    pub fn insert(&self, key: &str, data: &Value, ctime: f64) -> Result<(), CacheError> {
        let mut document = self.load_document().unwrap_or_default();
        document.insert(key.to_string(), json!({ "data": data, "ctime": ctime }));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_string_pretty(&Value::Object(document))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(key, path = %self.path.display(), "cache entry written");
        Ok(())
    }

    /// Loads the store document, tolerating a missing or corrupt file
    ///
    /// Returns `None` when the file is absent or unreadable/unparseable; a
    /// corrupt file is logged and treated as empty by writers.
    fn load_document(&self) -> Option<Map<String, Value>> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                warn!(path = %self.path.display(), "cache store is not a JSON object; ignoring");
                None
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "cache store is unparseable; ignoring");
                None
            }
        }
    }
}

/// Validates a raw store value as a well-formed entry
///
/// An entry must be an object holding both a non-null `data` payload and a
/// numeric `ctime`, never one without the other.
fn parse_entry(raw: &Value) -> Option<CacheEntry> {
    let object = raw.as_object()?;
    let data = object.get("data")?;
    if data.is_null() {
        return None;
    }
    let ctime = object.get("ctime")?.as_f64()?;
    Some(CacheEntry {
        data: data.clone(),
        ctime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (CacheStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CacheStore::new(temp_dir.path().join("coingecko.json"));
        (store, temp_dir)
    }

    #[test]
    fn test_lookup_on_missing_file_is_none() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.lookup("coins_list").is_none());
    }

    #[test]
    fn test_insert_then_lookup_roundtrip() {
        let (store, _temp_dir) = create_test_store();
        let payload = json!([{"id": "bitcoin", "symbol": "btc"}]);

        store
            .insert("coins_list", &payload, 1_700_000_000.0)
            .expect("Insert should succeed");

        let entry = store.lookup("coins_list").expect("Entry should exist");
        assert_eq!(entry.data, payload);
        assert!((entry.ctime - 1_700_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lookup_missing_key_is_none() {
        let (store, _temp_dir) = create_test_store();
        store
            .insert("coins_list", &json!([]), 1.0)
            .expect("Insert should succeed");

        assert!(store.lookup("coins_markets").is_none());
    }

    #[test]
    fn test_null_data_is_treated_as_miss() {
        let (store, _temp_dir) = create_test_store();
        fs::write(
            store.path(),
            r#"{"coins_list": {"data": null, "ctime": 123.0}}"#,
        )
        .expect("Should seed store file");

        assert!(store.lookup("coins_list").is_none());
    }

    #[test]
    fn test_missing_ctime_is_treated_as_miss() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), r#"{"coins_list": {"data": [1, 2, 3]}}"#)
            .expect("Should seed store file");

        assert!(store.lookup("coins_list").is_none());
    }

    #[test]
    fn test_non_object_entry_is_treated_as_miss() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), r#"{"coins_list": "not an entry"}"#)
            .expect("Should seed store file");

        assert!(store.lookup("coins_list").is_none());
    }

    #[test]
    fn test_unparseable_store_is_treated_as_empty() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.path(), "{ not json }").expect("Should seed store file");

        assert!(store.lookup("coins_list").is_none());

        // A corrupt store must not block new writes
        store
            .insert("coins_list", &json!(["fresh"]), 2.0)
            .expect("Insert over corrupt store should succeed");
        assert!(store.lookup("coins_list").is_some());
    }

    #[test]
    fn test_insert_preserves_other_keys() {
        let (store, _temp_dir) = create_test_store();
        store
            .insert("coins_list", &json!(["a"]), 1.0)
            .expect("Insert should succeed");
        store
            .insert("coins_markets", &json!(["b"]), 2.0)
            .expect("Insert should succeed");

        // Overwrite only the first key
        store
            .insert("coins_list", &json!(["c"]), 3.0)
            .expect("Insert should succeed");

        let markets = store.lookup("coins_markets").expect("Sibling key should survive");
        assert_eq!(markets.data, json!(["b"]));
        assert!((markets.ctime - 2.0).abs() < f64::EPSILON);

        let list = store.lookup("coins_list").expect("Overwritten key should exist");
        assert_eq!(list.data, json!(["c"]));
    }

    #[test]
    fn test_insert_preserves_malformed_sibling_entries_verbatim() {
        let (store, _temp_dir) = create_test_store();
        fs::write(
            store.path(),
            r#"{"broken": {"data": null, "ctime": 9.0}}"#,
        )
        .expect("Should seed store file");

        store
            .insert("coins_list", &json!(["ok"]), 1.0)
            .expect("Insert should succeed");

        let content = fs::read_to_string(store.path()).expect("Should read store file");
        let document: Value = serde_json::from_str(&content).expect("Store should stay valid JSON");
        assert_eq!(document["broken"], json!({"data": null, "ctime": 9.0}));
        assert_eq!(document["coins_list"]["data"], json!(["ok"]));
    }

    #[test]
    fn test_insert_creates_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("cache").join("store.json");
        let store = CacheStore::new(nested.clone());

        store
            .insert("coins_list", &json!([]), 1.0)
            .expect("Insert should succeed");

        assert!(nested.exists(), "Store file should exist under created dirs");
    }

    #[test]
    fn test_insert_leaves_no_temporary_file_behind() {
        let (store, temp_dir) = create_test_store();
        store
            .insert("coins_list", &json!([]), 1.0)
            .expect("Insert should succeed");

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .expect("Should list temp dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty(), "No .tmp file should remain after rename");
    }

    #[test]
    fn test_insert_fails_when_path_is_unwritable() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // Using a directory as the store path forces the rename to fail
        let blocked = temp_dir.path().join("store");
        fs::create_dir(&blocked).expect("Should create blocking directory");
        let store = CacheStore::new(blocked);

        let result = store.insert("coins_list", &json!([]), 1.0);
        assert!(matches!(result, Err(CacheError::Io(_))));
    }
}
