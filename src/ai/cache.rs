//! Generation Cache
//!
//! Content-addressed store mapping (unit content identity, unit kind,
//! generation-config fingerprint) to previously generated text. A hit is
//! only valid when the key's hash matches the current unit bit-for-bit;
//! there is no partial or fuzzy matching. Renamed-but-unchanged units hash
//! differently on purpose, trading a miss for correctness simplicity.
//!
//! ## Concurrency
//!
//! Entries live in a `DashMap`: concurrent reads/writes from workers with
//! last-writer-wins on duplicate keys. Entries are value-immutable once
//! written, so races degrade to redundant work, never corruption.
//!
//! ## Persistence
//!
//! Optionally persisted as one JSON record per entry with a CRC32 checksum
//! of the text. Corrupt, unreadable, or checksum-mismatched records are
//! treated as misses, never as errors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::types::{Result, UnitKind};

/// Compute a cache key from a unit's structural identity, its kind, and the
/// generation-config fingerprint.
pub fn cache_key(content_identity: &str, kind: UnitKind, config_fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content_identity.as_bytes());
    hasher.update([0]);
    hasher.update(kind.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(config_fingerprint.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// One cached generation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

/// On-disk record wrapping an entry with an integrity checksum
#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    entry: CacheEntry,
    checksum: u32,
}

/// Cache hit/miss counters for the run summary
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct GenerationCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    persist_dir: Option<PathBuf>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl GenerationCache {
    /// Construct from configuration, loading any valid persisted records
    pub fn new(config: &CacheConfig) -> Self {
        let persist_dir = config.persist.then(|| config.dir.clone());
        let cache = Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(config.ttl_hours * 3600),
            persist_dir,
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        };

        if let Some(dir) = &cache.persist_dir {
            cache.load_persisted(dir);
        }

        cache
    }

    /// In-memory cache with an explicit TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            persist_dir: None,
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Look up a key. An entry older than the TTL is treated as absent
    /// (lazy expiry; no background sweep is needed for correctness).
    pub fn get(&self, key: &str) -> Option<String> {
        use std::sync::atomic::Ordering;

        let expired = match self.entries.get_mut(key) {
            Some(mut entry) => {
                if self.is_expired(&entry) {
                    true
                } else {
                    entry.last_access = Utc::now();
                    let text = entry.text.clone();
                    drop(entry);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(text);
                }
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if expired {
            debug!("Cache entry expired: {}", key);
            self.entries.remove(key);
            self.remove_persisted(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a value. Last writer wins on duplicate keys.
    pub fn put(&self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        if text.len() > crate::constants::cache::MAX_CACHED_CONTENT_SIZE {
            warn!(
                "Refusing to cache oversized entry ({} bytes): {}",
                text.len(),
                key
            );
            return;
        }
        let entry = CacheEntry {
            key: key.clone(),
            text,
            created_at: Utc::now(),
            last_access: Utc::now(),
        };

        if let Some(dir) = &self.persist_dir
            && let Err(e) = self.write_persisted(dir, &entry)
        {
            warn!("Failed to persist cache entry {}: {}", key, e);
        }

        self.entries.insert(key, entry);
    }

    /// Opportunistically drop expired entries to bound storage
    pub fn sweep(&self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| self.is_expired(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.remove_persisted(key);
        }

        if !expired.is_empty() {
            info!("Swept {} expired cache entries", expired.len());
        }
        expired.len()
    }

    /// Write all live entries to disk. Call once on shutdown.
    pub fn flush(&self) -> Result<()> {
        let Some(dir) = &self.persist_dir else {
            return Ok(());
        };

        std::fs::create_dir_all(dir)?;
        for entry in self.entries.iter() {
            self.write_persisted(dir, entry.value())?;
        }
        debug!("Flushed {} cache entries", self.entries.len());
        Ok(())
    }

    /// Remove every entry, in memory and on disk
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.entries.remove(&key);
            self.remove_persisted(&key);
        }
        count
    }

    pub fn stats(&self) -> CacheStats {
        use std::sync::atomic::Ordering;
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        let age = Utc::now().signed_duration_since(entry.created_at);
        age.to_std().map(|age| age >= self.ttl).unwrap_or(false)
    }

    fn entry_path(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{}.json", key))
    }

    fn write_persisted(&self, dir: &Path, entry: &CacheEntry) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let record = PersistedEntry {
            entry: entry.clone(),
            checksum: crc32fast::hash(entry.text.as_bytes()),
        };
        let content = serde_json::to_string(&record)?;
        std::fs::write(Self::entry_path(dir, &entry.key), content)?;
        Ok(())
    }

    fn remove_persisted(&self, key: &str) {
        if let Some(dir) = &self.persist_dir {
            let _ = std::fs::remove_file(Self::entry_path(dir, key));
        }
    }

    /// Load persisted records, silently skipping anything unreadable,
    /// corrupt, checksum-mismatched, or expired.
    fn load_persisted(&self, dir: &Path) {
        let Ok(read_dir) = std::fs::read_dir(dir) else {
            return;
        };

        let mut loaded = 0usize;
        for entry in read_dir.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }

            let Ok(content) = std::fs::read_to_string(&path) else {
                debug!("Unreadable cache record: {}", path.display());
                continue;
            };
            let Ok(record) = serde_json::from_str::<PersistedEntry>(&content) else {
                debug!("Corrupt cache record: {}", path.display());
                continue;
            };
            if crc32fast::hash(record.entry.text.as_bytes()) != record.checksum {
                warn!("Checksum mismatch in cache record: {}", path.display());
                continue;
            }
            if self.is_expired(&record.entry) {
                continue;
            }

            self.entries.insert(record.entry.key.clone(), record.entry);
            loaded += 1;
        }

        if loaded > 0 {
            info!("Loaded {} persisted cache entries", loaded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn persistent_cache(dir: &Path) -> GenerationCache {
        GenerationCache::new(&CacheConfig {
            dir: dir.to_path_buf(),
            ttl_hours: 1,
            persist: true,
        })
    }

    #[test]
    fn test_key_depends_on_all_components() {
        let base = cache_key("identity", UnitKind::File, "cfg");
        assert_ne!(base, cache_key("identity2", UnitKind::File, "cfg"));
        assert_ne!(base, cache_key("identity", UnitKind::Class, "cfg"));
        assert_ne!(base, cache_key("identity", UnitKind::File, "cfg2"));
        assert_eq!(base, cache_key("identity", UnitKind::File, "cfg"));
    }

    #[test]
    fn test_put_get_roundtrip() {
        let cache = GenerationCache::with_ttl(Duration::from_secs(60));
        let key = cache_key("fn f()", UnitKind::Function, "cfg");

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), "documentation text");
        assert_eq!(cache.get(&key).as_deref(), Some("documentation text"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_ttl_expiry_is_lazy() {
        let cache = GenerationCache::with_ttl(Duration::ZERO);
        cache.put("k", "v");
        // Entry exists but is already past its TTL
        assert_eq!(cache.len(), 1);
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = GenerationCache::with_ttl(Duration::from_secs(60));
        cache.put("k", "first");
        cache.put("k", "second");
        assert_eq!(cache.get("k").as_deref(), Some("second"));
    }

    #[test]
    fn test_persistence_roundtrip() {
        let temp = TempDir::new().unwrap();
        {
            let cache = persistent_cache(temp.path());
            cache.put("key1", "persisted text");
            cache.flush().unwrap();
        }

        let reloaded = persistent_cache(temp.path());
        assert_eq!(reloaded.get("key1").as_deref(), Some("persisted text"));
    }

    #[test]
    fn test_corrupt_record_is_a_miss() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad.json"), "{not json").unwrap();

        let cache = persistent_cache(temp.path());
        assert!(cache.is_empty());
        assert!(cache.get("bad").is_none());
    }

    #[test]
    fn test_checksum_mismatch_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let record = r#"{"entry":{"key":"k","text":"tampered","created_at":"2099-01-01T00:00:00Z","last_access":"2099-01-01T00:00:00Z"},"checksum":1}"#;
        std::fs::write(temp.path().join("k.json"), record).unwrap();

        let cache = persistent_cache(temp.path());
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_sweep_removes_expired() {
        let cache = GenerationCache::with_ttl(Duration::ZERO);
        cache.put("a", "1");
        cache.put("b", "2");
        assert_eq!(cache.sweep(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_removes_files() {
        let temp = TempDir::new().unwrap();
        let cache = persistent_cache(temp.path());
        cache.put("k", "v");
        assert!(temp.path().join("k.json").exists());

        cache.clear();
        assert!(!temp.path().join("k.json").exists());
        assert!(cache.is_empty());
    }
}
