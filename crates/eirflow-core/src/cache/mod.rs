//! Local response cache.
//!
//! `CacheManager` stores one `{timestamp, data}` JSON envelope per key and
//! treats entries older than five minutes as absent, deleting them on the
//! read that notices. Keys are one per dashboard domain:
//! - `busHeatmap`, `bikePredictions`, `eventsData`
//! - `pedestrianData`, `airPollution`

pub mod manager;

pub use manager::{keys, now_millis, updated_label, CacheEntry, CacheManager, CACHE_TTL_MS};
