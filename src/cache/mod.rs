//! Caching module for oracle replies
//!
//! Only successful replies are cached. Keys digest the query together
//! with the full corpus sent to the oracle, so a changed record set
//! never hits a stale entry.

use moka::future::Cache;
use std::time::Duration;

/// Which oracle operation a cached reply belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleCall {
    Enrich,
    DirectMatch,
}

impl OracleCall {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Enrich => "enrich",
            Self::DirectMatch => "match",
        }
    }
}

/// Cache for oracle replies
pub struct OracleCache {
    cache: Cache<String, Vec<String>>,
}

impl OracleCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Get a cached reply
    pub async fn get(&self, key: &str) -> Option<Vec<String>> {
        self.cache.get(key).await
    }

    /// Store a reply
    pub async fn set(&self, key: String, value: Vec<String>) {
        self.cache.insert(key, value).await;
    }

    /// Number of live entries, after pending maintenance has run
    pub async fn size(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for OracleCache {
    fn default() -> Self {
        Self::new(300, 1000)
    }
}

/// Generate a cache key for an oracle call
pub fn oracle_cache_key<S: AsRef<str>>(call: OracleCall, query: &str, context: &[S]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(call.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(query.as_bytes());
    for item in context {
        hasher.update([0u8]);
        hasher.update(item.as_ref().as_bytes());
    }

    format!("{:x}", hasher.finalize())
}
