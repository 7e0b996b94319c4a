//! Result cache keyed by query hash, with a fixed expiry window.
//!
//! Caching is best effort. A missing, corrupt or expired entry is a miss,
//! and a failed write is logged and forgotten; neither ever reaches the
//! caller. [`FileCache`] keeps one JSON file per query and is what the CLI
//! uses. [`MemoryCache`] is backed by [`moka`] and honours the same
//! contract, which makes it the natural choice in tests.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use md5::{Digest, Md5};
use moka::future::Cache;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{CacheEntry, SearchResult};

/// Maximum number of result sets held by [`MemoryCache`].
const MAX_MEMORY_ENTRIES: u64 = 100;

/// Upper bound on moka's eviction TTL, which rejects anything past 1000 years.
const MAX_MEMORY_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Keyed persistence of previous search results.
pub trait CacheStore: Send + Sync {
    /// Look up results for `query`. Expired or unreadable entries are `None`.
    fn get(&self, query: &str) -> impl Future<Output = Option<Vec<SearchResult>>> + Send;

    /// Store `results` for `query`, replacing any previous entry.
    /// Empty result sets are never stored.
    fn put(&self, query: &str, results: &[SearchResult]) -> impl Future<Output = ()> + Send;
}

/// Deterministic 128-bit storage key for a query: lowercase hex MD5.
///
/// The query is hashed exactly as given, so `"Rust"` and `"rust"` are
/// cached separately.
pub fn cache_key(query: &str) -> String {
    format!("{:x}", Md5::digest(query.as_bytes()))
}

/// On-disk cache: `<dir>/<cache_key(query)>.json`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl_seconds: u64,
}

impl FileCache {
    /// Cache rooted at `dir`. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>, ttl_seconds: u64) -> Self {
        Self {
            dir: dir.into(),
            ttl_seconds,
        }
    }

    /// The directory entries are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry file for `query`, whether or not it exists.
    pub fn entry_path(&self, query: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(query)))
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<CacheEntry>, SearchError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SearchError::Cache(e.to_string()))
    }

    async fn write_entry(&self, path: &Path, entry: &CacheEntry) -> Result<(), SearchError> {
        let json =
            serde_json::to_string_pretty(entry).map_err(|e| SearchError::Cache(e.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write beside the target and rename, so readers never see half a file.
        let tmp = path.with_extension(format!("json.{:016x}.tmp", rand::random::<u64>()));
        if let Err(e) = tokio::fs::write(&tmp, json).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

impl CacheStore for FileCache {
    async fn get(&self, query: &str) -> Option<Vec<SearchResult>> {
        let path = self.entry_path(query);
        let entry = match self.read_entry(&path).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error reading cache");
                return None;
            }
        };

        if entry.is_expired_at(Utc::now(), self.ttl_seconds) {
            tracing::debug!(query, "cache entry expired");
            return None;
        }

        tracing::info!(query, "using cached results");
        Some(entry.results)
    }

    async fn put(&self, query: &str, results: &[SearchResult]) {
        if results.is_empty() {
            return;
        }
        let path = self.entry_path(query);
        let entry = CacheEntry::new(query, results.to_vec());
        match self.write_entry(&path, &entry).await {
            Ok(()) => tracing::debug!(query, path = %path.display(), "results saved to cache"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "error saving to cache"),
        }
    }
}

/// In-process cache with the same expiry contract as [`FileCache`].
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, CacheEntry>,
    ttl_seconds: u64,
}

impl MemoryCache {
    /// Create an empty cache whose entries expire after `ttl_seconds`.
    pub fn new(ttl_seconds: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(MAX_MEMORY_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_seconds.max(1)).min(MAX_MEMORY_TTL))
            .build();
        Self {
            entries,
            ttl_seconds,
        }
    }

    /// Insert a prepared entry as-is, keeping its timestamp.
    pub async fn insert_entry(&self, entry: CacheEntry) {
        self.entries.insert(cache_key(&entry.query), entry).await;
    }

    /// Whether an entry (expired or not) is stored for `query`.
    pub async fn contains(&self, query: &str) -> bool {
        self.entries.get(&cache_key(query)).await.is_some()
    }
}

impl CacheStore for MemoryCache {
    async fn get(&self, query: &str) -> Option<Vec<SearchResult>> {
        let entry = self.entries.get(&cache_key(query)).await?;
        if entry.is_expired_at(Utc::now(), self.ttl_seconds) {
            tracing::debug!(query, "cache entry expired");
            return None;
        }
        Some(entry.results)
    }

    async fn put(&self, query: &str, results: &[SearchResult]) {
        if results.is_empty() {
            return;
        }
        self.insert_entry(CacheEntry::new(query, results.to_vec()))
            .await;
    }
}

/// The cache backend chosen at runtime from configuration.
#[derive(Clone)]
pub enum CacheBackend {
    /// One JSON file per query.
    File(FileCache),
    /// Caching turned off: every lookup misses, every write is dropped.
    Disabled,
}

impl CacheBackend {
    /// [`CacheBackend::File`] under `config.cache_dir`, or
    /// [`CacheBackend::Disabled`] when `config.use_cache` is off.
    pub fn from_config(config: &SearchConfig) -> Self {
        if config.use_cache {
            Self::File(FileCache::new(&config.cache_dir, config.cache_ttl_seconds))
        } else {
            Self::Disabled
        }
    }
}

impl CacheStore for CacheBackend {
    async fn get(&self, query: &str) -> Option<Vec<SearchResult>> {
        match self {
            Self::File(cache) => cache.get(query).await,
            Self::Disabled => None,
        }
    }

    async fn put(&self, query: &str, results: &[SearchResult]) {
        match self {
            Self::File(cache) => cache.put(query, results).await,
            Self::Disabled => {}
        }
    }
}
