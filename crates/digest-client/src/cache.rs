//! File-backed local cache for generated notes.
//!
//! Persists the done-with-no-error note set as a single JSON file in the
//! data directory, keyed by diff id with a first-write timestamp per
//! entry. Entries older than the 24h TTL are discarded on load. Every
//! failure mode degrades to "no cache" with a log line; caching is an
//! optimization and never fails a run.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DIGEST_DATA_DIR`: Directory holding the cache file (default: data)

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use digest_core::{defaults, CacheEntry, GeneratedNotes};

/// Contents of the single-shot clear directive file.
#[derive(Debug, Deserialize)]
struct ClearDirective {
    action: String,
    /// Millisecond epoch at which the directive was written. Informational.
    #[serde(default)]
    timestamp: i64,
}

/// Notes cache rooted at a data directory, or disabled.
#[derive(Debug, Clone)]
pub struct NotesCache {
    dir: Option<PathBuf>,
}

impl NotesCache {
    /// Create a cache rooted at the given data directory.
    ///
    /// The directory is created lazily on first save.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(data_dir.into()),
        }
    }

    /// Create a disabled cache (for testing or cache-less runs).
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Create a cache from environment configuration.
    ///
    /// Reads:
    /// - `DIGEST_DATA_DIR` (default: data)
    pub fn from_env() -> Self {
        let dir = std::env::var("DIGEST_DATA_DIR").unwrap_or_else(|_| "data".to_string());
        Self::new(dir)
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    fn cache_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(defaults::CACHE_FILE_NAME))
    }

    fn clear_path(&self) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|d| d.join(defaults::CACHE_CLEAR_FILE_NAME))
    }

    /// Load all unexpired entries, obeying a pending clear directive first.
    pub fn load(&self) -> HashMap<String, GeneratedNotes> {
        let Some(path) = self.cache_path() else {
            return HashMap::new();
        };

        self.consume_clear_directive();

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No notes cache file yet");
                return HashMap::new();
            }
            Err(e) => {
                warn!("Failed to read notes cache: {}", e);
                return HashMap::new();
            }
        };

        let entries: HashMap<String, CacheEntry> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Corrupt notes cache ignored: {}", e);
                return HashMap::new();
            }
        };

        let now = Utc::now().timestamp_millis();
        let total = entries.len();
        let fresh: HashMap<String, GeneratedNotes> = entries
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired(now, defaults::NOTES_CACHE_TTL_MS))
            .map(|(id, entry)| (id, entry.data))
            .collect();

        debug!(
            loaded = fresh.len(),
            expired = total - fresh.len(),
            "Notes cache loaded"
        );
        fresh
    }

    /// Persist the given notes, preserving first-write timestamps.
    ///
    /// `notes` is the complete done-with-no-error set; the file is
    /// rewritten to match it exactly. Ids already on disk keep their
    /// original timestamp so the TTL clock runs from first persistence,
    /// not from the latest save. An id whose previous record had expired
    /// is re-stamped; its notes were regenerated, so its clock restarts.
    pub fn save(&self, notes: &HashMap<String, GeneratedNotes>) -> bool {
        let Some(path) = self.cache_path() else {
            return false;
        };

        let existing = self.read_existing();
        let now = Utc::now().timestamp_millis();

        let entries: HashMap<&String, CacheEntry> = notes
            .iter()
            .map(|(id, data)| {
                let timestamp = existing
                    .get(id)
                    .filter(|prev| !prev.is_expired(now, defaults::NOTES_CACHE_TTL_MS))
                    .map(|prev| prev.timestamp)
                    .unwrap_or(now);
                (
                    id,
                    CacheEntry {
                        timestamp,
                        data: data.clone(),
                    },
                )
            })
            .collect();

        if let Some(dir) = &self.dir {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("Failed to create cache directory: {}", e);
                return false;
            }
        }

        let serialized = match serde_json::to_string(&entries) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize notes cache: {}", e);
                return false;
            }
        };

        match std::fs::write(&path, serialized) {
            Ok(()) => {
                debug!(entry_count = entries.len(), "Notes cache saved");
                true
            }
            Err(e) => {
                warn!("Failed to write notes cache: {}", e);
                false
            }
        }
    }

    /// Delete the persisted cache file.
    pub fn clear(&self) -> bool {
        let Some(path) = self.cache_path() else {
            return false;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Notes cache cleared");
                true
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Failed to clear notes cache: {}", e);
                false
            }
        }
    }

    /// Apply and remove a pending clear directive, if present.
    fn consume_clear_directive(&self) {
        let Some(path) = self.clear_path() else {
            return;
        };
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!("Failed to read clear directive: {}", e);
                return;
            }
        };

        match serde_json::from_str::<ClearDirective>(&raw) {
            Ok(directive) if directive.action == defaults::CACHE_CLEAR_ACTION => {
                info!(
                    issued_at = directive.timestamp,
                    "Clearing notes cache by directive"
                );
                self.clear();
            }
            Ok(directive) => {
                warn!(action = %directive.action, "Ignoring clear directive with unknown action");
            }
            Err(e) => {
                warn!("Ignoring malformed clear directive: {}", e);
            }
        }

        // Single shot: the directive is consumed whether or not it applied.
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("Failed to remove clear directive: {}", e);
        }
    }

    fn read_existing(&self) -> HashMap<String, CacheEntry> {
        let Some(path) = self.cache_path() else {
            return HashMap::new();
        };
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_notes(tag: &str) -> GeneratedNotes {
        GeneratedNotes {
            developer_note: format!("dev {}", tag),
            marketing_note: format!("mkt {}", tag),
        }
    }

    fn notes_map(ids: &[&str]) -> HashMap<String, GeneratedNotes> {
        ids.iter()
            .map(|id| (id.to_string(), sample_notes(id)))
            .collect()
    }

    fn write_cache_file(dir: &TempDir, entries: serde_json::Value) {
        std::fs::write(
            dir.path().join(defaults::CACHE_FILE_NAME),
            entries.to_string(),
        )
        .unwrap();
    }

    fn read_cache_file(dir: &TempDir) -> HashMap<String, CacheEntry> {
        let raw = std::fs::read_to_string(dir.path().join(defaults::CACHE_FILE_NAME)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());

        assert!(cache.save(&notes_map(&["42", "99"])));
        let loaded = cache.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("42"), Some(&sample_notes("42")));
        assert_eq!(loaded.get("99"), Some(&sample_notes("99")));
    }

    #[test]
    fn test_load_without_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_disabled_cache_is_inert() {
        let cache = NotesCache::disabled();
        assert!(!cache.is_enabled());
        assert!(!cache.save(&notes_map(&["42"])));
        assert!(cache.load().is_empty());
        assert!(!cache.clear());
    }

    #[test]
    fn test_expired_entries_pruned_on_load() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now().timestamp_millis();
        write_cache_file(
            &dir,
            json!({
                "old": {
                    "timestamp": now - defaults::NOTES_CACHE_TTL_MS - 1,
                    "data": {"developerNote": "stale", "marketingNote": "stale"}
                },
                "fresh": {
                    "timestamp": now - 1000,
                    "data": {"developerNote": "dev fresh", "marketingNote": "mkt fresh"}
                }
            }),
        );

        let cache = NotesCache::new(dir.path());
        let loaded = cache.load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("fresh"));
    }

    #[test]
    fn test_corrupt_cache_file_swallowed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(defaults::CACHE_FILE_NAME), "{not json").unwrap();

        let cache = NotesCache::new(dir.path());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_first_write_timestamp_preserved_across_saves() {
        let dir = TempDir::new().unwrap();
        let original_ts = Utc::now().timestamp_millis() - 5_000;
        write_cache_file(
            &dir,
            json!({
                "42": {
                    "timestamp": original_ts,
                    "data": {"developerNote": "dev 42", "marketingNote": "mkt 42"}
                }
            }),
        );

        let cache = NotesCache::new(dir.path());
        assert!(cache.save(&notes_map(&["42"])));

        let on_disk = read_cache_file(&dir);
        assert_eq!(on_disk["42"].timestamp, original_ts);
    }

    #[test]
    fn test_expired_previous_record_is_restamped() {
        let dir = TempDir::new().unwrap();
        let before = Utc::now().timestamp_millis();
        write_cache_file(
            &dir,
            json!({
                "42": {
                    "timestamp": before - defaults::NOTES_CACHE_TTL_MS - 1,
                    "data": {"developerNote": "regenerated", "marketingNote": "regenerated"}
                }
            }),
        );

        let cache = NotesCache::new(dir.path());
        assert!(cache.save(&notes_map(&["42"])));

        let on_disk = read_cache_file(&dir);
        assert!(on_disk["42"].timestamp >= before);
    }

    #[test]
    fn test_new_ids_stamped_with_current_time() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());

        let before = Utc::now().timestamp_millis();
        assert!(cache.save(&notes_map(&["7"])));
        let after = Utc::now().timestamp_millis();

        let on_disk = read_cache_file(&dir);
        assert!(on_disk["7"].timestamp >= before && on_disk["7"].timestamp <= after);
    }

    #[test]
    fn test_save_rewrites_file_to_given_set() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());

        assert!(cache.save(&notes_map(&["1", "2"])));
        assert!(cache.save(&notes_map(&["1"])));

        let on_disk = read_cache_file(&dir);
        assert_eq!(on_disk.len(), 1);
        assert!(on_disk.contains_key("1"));
    }

    #[test]
    fn test_save_creates_missing_data_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("data");
        let cache = NotesCache::new(&nested);

        assert!(cache.save(&notes_map(&["42"])));
        assert!(nested.join(defaults::CACHE_FILE_NAME).exists());
    }

    #[test]
    fn test_clear_directive_wipes_cache_and_is_consumed() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());
        assert!(cache.save(&notes_map(&["42"])));

        let directive_path = dir.path().join(defaults::CACHE_CLEAR_FILE_NAME);
        std::fs::write(
            &directive_path,
            json!({
                "action": defaults::CACHE_CLEAR_ACTION,
                "timestamp": Utc::now().timestamp_millis()
            })
            .to_string(),
        )
        .unwrap();

        assert!(cache.load().is_empty());
        assert!(!directive_path.exists());
        assert!(!dir.path().join(defaults::CACHE_FILE_NAME).exists());
    }

    #[test]
    fn test_malformed_directive_consumed_without_wipe() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());
        assert!(cache.save(&notes_map(&["42"])));

        let directive_path = dir.path().join(defaults::CACHE_CLEAR_FILE_NAME);
        std::fs::write(&directive_path, "{broken").unwrap();

        let loaded = cache.load();
        assert_eq!(loaded.len(), 1);
        assert!(!directive_path.exists());
    }

    #[test]
    fn test_unknown_action_directive_does_not_wipe() {
        let dir = TempDir::new().unwrap();
        let cache = NotesCache::new(dir.path());
        assert!(cache.save(&notes_map(&["42"])));

        let directive_path = dir.path().join(defaults::CACHE_CLEAR_FILE_NAME);
        std::fs::write(
            &directive_path,
            json!({"action": "compact-cache", "timestamp": 0}).to_string(),
        )
        .unwrap();

        assert_eq!(cache.load().len(), 1);
        assert!(!directive_path.exists());
    }
}
