use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Entries older than this are treated as absent.
pub const CACHE_TTL_MS: i64 = 5 * 60 * 1000;

/// Subdirectory of the cache dir holding response entries. The session file
/// lives beside it, so clearing responses never logs the user out.
const RESPONSES_DIR: &str = "responses";

/// Cache keys, one per dashboard domain.
pub mod keys {
    pub const BUS_HEATMAP: &str = "busHeatmap";
    pub const BIKE_PREDICTIONS: &str = "bikePredictions";
    pub const EVENTS: &str = "eventsData";
    pub const PEDESTRIAN: &str = "pedestrianData";
    pub const AIR_POLLUTION: &str = "airPollution";

    pub const ALL: [&str; 5] = [BUS_HEATMAP, BIKE_PREDICTIONS, EVENTS, PEDESTRIAN, AIR_POLLUTION];
}

/// Stored envelope: write time in epoch milliseconds plus the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: i64,
    pub data: Value,
}

impl CacheEntry {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }

    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) < CACHE_TTL_MS
    }
}

/// "3m ago" style age of a write made at `timestamp`.
pub fn age_label(timestamp: i64, now_ms: i64) -> String {
    let minutes = (now_ms - timestamp) / 60_000;
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Status bar text for the newest write, or "never".
pub fn updated_label(last_write: Option<i64>, now_ms: i64) -> String {
    last_write
        .map(|timestamp| age_label(timestamp, now_ms))
        .unwrap_or_else(|| "never".to_string())
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// TTL response cache persisted as one JSON file per key.
///
/// Every failure is logged and swallowed: a read that cannot be completed is
/// a miss and a write that cannot be completed is dropped.
#[derive(Debug, Clone)]
pub struct CacheManager {
    dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: &Path) -> Self {
        let dir = cache_dir.join(RESPONSES_DIR);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "Cache directory unavailable, caching disabled");
        }
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bytes outside `[A-Za-z0-9_-]` are written as `%XX`, so distinct keys
    /// never share a file and no key can leave the cache directory.
    fn cache_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len());
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                name.push(char::from(b));
            } else {
                name.push_str(&format!("%{:02X}", b));
            }
        }
        self.dir.join(format!("{}.json", name))
    }

    fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.cache_path(key);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read cache entry");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = key, error = %e, "Corrupt cache entry, ignoring");
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, now_millis())
    }

    /// Fresh data for `key` as of `now_ms`. A stale entry is deleted.
    pub fn get_at(&self, key: &str, now_ms: i64) -> Option<Value> {
        let entry = self.read_entry(key)?;
        if entry.is_fresh(now_ms) {
            debug!(key = key, age_ms = entry.age_ms(now_ms), "Cache hit");
            Some(entry.data)
        } else {
            debug!(key = key, "Cache entry expired");
            self.remove(key);
            None
        }
    }

    pub fn set(&self, key: &str, data: Value) {
        self.set_at(key, data, now_millis());
    }

    pub fn set_at(&self, key: &str, data: Value, now_ms: i64) {
        let entry = CacheEntry {
            timestamp: now_ms,
            data,
        };
        let contents = match serde_json::to_string(&entry) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = std::fs::write(self.cache_path(key), contents) {
            warn!(key = key, error = %e, "Failed to write cache entry");
        }
    }

    /// Typed read. Data that no longer fits `T` is a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key = key, error = %e, "Cached data has unexpected shape");
                None
            }
        }
    }

    pub fn set_as<T: Serialize>(&self, key: &str, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => self.set(key, value),
            Err(e) => warn!(key = key, error = %e, "Failed to serialize cache data"),
        }
    }

    pub fn remove(&self, key: &str) {
        let path = self.cache_path(key);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key = key, error = %e, "Failed to remove cache entry");
            }
        }
    }

    /// Remove every response entry. Returns how many were deleted.
    pub fn clear(&self) -> usize {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to list cache directory");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove cache file"),
                }
            }
        }
        debug!(removed = removed, "Cache cleared");
        removed
    }

    /// Write time of the newest fresh entry across all domains.
    pub fn last_write(&self) -> Option<i64> {
        let now = now_millis();
        keys::ALL
            .iter()
            .filter_map(|key| self.read_entry(key))
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.timestamp)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_dir(name: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "eirflow-cache-{}-{}-{}",
            name,
            std::process::id(),
            n
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_get_after_set_returns_same_data() {
        let dir = temp_dir("roundtrip");
        let cache = CacheManager::new(&dir);
        let data = json!([{"id": 1, "name": "Pearse St", "demand_ratio": 0.62}]);

        cache.set_at(keys::BIKE_PREDICTIONS, data.clone(), 1_000);
        assert_eq!(cache.get_at(keys::BIKE_PREDICTIONS, 1_000), Some(data.clone()));
        assert_eq!(
            cache.get_at(keys::BIKE_PREDICTIONS, 1_000 + CACHE_TTL_MS - 1),
            Some(data)
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let dir = temp_dir("expiry");
        let cache = CacheManager::new(&dir);
        cache.set_at(keys::BIKE_PREDICTIONS, json!([1, 2, 3]), 0);

        assert_eq!(cache.get_at(keys::BIKE_PREDICTIONS, CACHE_TTL_MS + 1), None);
        assert!(!cache.cache_path(keys::BIKE_PREDICTIONS).exists());

        // Exactly TTL old is already expired
        cache.set_at(keys::EVENTS, json!([]), 0);
        assert_eq!(cache.get_at(keys::EVENTS, CACHE_TTL_MS), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let dir = temp_dir("overwrite");
        let cache = CacheManager::new(&dir);
        cache.set_at("k", json!({"a": 1, "b": 2}), 10);
        cache.set_at("k", json!({"c": 3}), 20);
        assert_eq!(cache.get_at("k", 30), Some(json!({"c": 3})));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = temp_dir("corrupt");
        let cache = CacheManager::new(&dir);
        std::fs::write(cache.cache_path(keys::AIR_POLLUTION), "{not json").unwrap();
        assert_eq!(cache.get(keys::AIR_POLLUTION), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unusable_directory_never_panics() {
        let dir = temp_dir("unusable");
        std::fs::create_dir_all(dir.parent().unwrap()).unwrap();
        // A regular file where the cache directory should be
        std::fs::write(&dir, "file").unwrap();

        let cache = CacheManager::new(&dir);
        cache.set("k", json!(1));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.clear(), 0);
        assert_eq!(cache.last_write(), None);
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn test_typed_helpers() {
        let dir = temp_dir("typed");
        let cache = CacheManager::new(&dir);
        cache.set_as("nums", &vec![1u32, 2, 3]);
        assert_eq!(cache.get_as::<Vec<u32>>("nums"), Some(vec![1, 2, 3]));
        // Shape mismatch is a miss
        assert_eq!(cache.get_as::<String>("nums"), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clear_removes_all_entries() {
        let dir = temp_dir("clear");
        let cache = CacheManager::new(&dir);
        for key in keys::ALL {
            cache.set(key, json!(key));
        }
        assert_eq!(cache.clear(), keys::ALL.len());
        for key in keys::ALL {
            assert_eq!(cache.get(key), None);
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_key_encoding() {
        let dir = temp_dir("names");
        let cache = CacheManager::new(&dir);
        let path = cache.cache_path("../route planner");
        assert_eq!(path.file_name().unwrap(), "%2E%2E%2Froute%20planner.json");
        assert_eq!(path.parent().unwrap(), cache.dir());
        assert_eq!(
            cache.cache_path(keys::BUS_HEATMAP).file_name().unwrap(),
            "busHeatmap.json"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_similar_keys_do_not_collide() {
        let dir = temp_dir("collide");
        let cache = CacheManager::new(&dir);
        assert_ne!(cache.cache_path("a b"), cache.cache_path("a_b"));
        assert_ne!(cache.cache_path("a%20b"), cache.cache_path("a b"));

        cache.set("a b", json!("spaced"));
        cache.set("a_b", json!("underscored"));
        assert_eq!(cache.get("a b"), Some(json!("spaced")));
        assert_eq!(cache.get("a_b"), Some(json!("underscored")));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_age_label() {
        assert_eq!(age_label(0, 30_000), "just now");
        assert_eq!(age_label(0, -5_000), "just now");
        assert_eq!(age_label(0, 3 * 60_000), "3m ago");
        assert_eq!(age_label(0, 90 * 60_000), "2h ago");
        assert_eq!(age_label(0, 36 * 60 * 60_000), "2d ago");
    }

    #[test]
    fn test_last_write_tracks_newest_fresh_entry() {
        let dir = temp_dir("last-write");
        let cache = CacheManager::new(&dir);
        assert_eq!(cache.last_write(), None);

        let now = now_millis();
        cache.set_at(keys::BUS_HEATMAP, json!([]), now - 60_000);
        cache.set_at(keys::EVENTS, json!([]), now - 1_000);
        // Expired entries do not count
        cache.set_at(keys::AIR_POLLUTION, json!([]), now - CACHE_TTL_MS - 1);
        assert_eq!(cache.last_write(), Some(now - 1_000));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_updated_label() {
        assert_eq!(updated_label(None, 1_000), "never");
        assert_eq!(updated_label(Some(0), 30_000), "just now");
        assert_eq!(updated_label(Some(0), 3 * 60_000), "3m ago");
    }
}
