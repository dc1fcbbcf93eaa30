//! Remote relevance oracle
//!
//! Two questions can be put to an oracle: which extra terms describe a
//! query (enrichment), and which records answer it (direct match).
//! [`Oracle`] wraps a backend and never fails. Transport errors,
//! non-success statuses, malformed replies, rate limiting and timeouts
//! all collapse into the fallback value of the call.

mod backends;
mod prompts;

pub use backends::{
    get_backend, list_backends, ChatOracle, DisabledOracle, HttpOracle, OracleBackend,
};
pub use prompts::{extract_json_array, Prompts};

use crate::cache::{oracle_cache_key, OracleCache, OracleCall};
use crate::config::{OracleSettings, SearchSettings};
use crate::metrics::Metrics;
use crate::network::HttpClient;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reported by oracle backends
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle returned status {0}")]
    Status(u16),

    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    #[error("oracle rate limit exceeded")]
    RateLimited,

    #[error("oracle disabled")]
    Disabled,

    #[error("oracle not configured: {0}")]
    Unconfigured(String),

    #[error("prompt template error: {0}")]
    Template(String),
}

/// Record summary sent to the oracle for direct matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRecord {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Outcome of an oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The oracle answered
    Answered(Vec<String>),
    /// The oracle failed; the value is the fallback
    Fallback(Vec<String>),
}

impl Reply {
    pub fn values(&self) -> &[String] {
        match self {
            Self::Answered(values) | Self::Fallback(values) => values,
        }
    }

    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Answered(values) | Self::Fallback(values) => values,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Total wrapper around an oracle backend
pub struct Oracle {
    backend: Box<dyn OracleBackend>,
    cache: Option<OracleCache>,
    limiter: Option<DefaultDirectRateLimiter>,
    metrics: Option<Arc<Metrics>>,
    direct_match_limit: usize,
}

impl Oracle {
    /// Wrap a backend with no cache, rate limit or metrics
    pub fn new(backend: Box<dyn OracleBackend>) -> Self {
        Self {
            backend,
            cache: None,
            limiter: None,
            metrics: None,
            direct_match_limit: SearchSettings::default().direct_match_limit,
        }
    }

    /// An oracle that always falls back
    pub fn disabled() -> Self {
        Self::new(Box::new(DisabledOracle))
    }

    /// Build the configured backend with caching and rate limiting
    pub fn from_settings(
        oracle: &OracleSettings,
        search: &SearchSettings,
        client: &HttpClient,
    ) -> Result<Self, OracleError> {
        let backend = get_backend(&oracle.backend, oracle, client)?;
        let mut wrapped = Self::new(backend)
            .with_rate_limit(oracle.requests_per_minute)
            .with_direct_match_limit(search.direct_match_limit);
        if oracle.cache_ttl > 0 && oracle.cache_capacity > 0 {
            wrapped = wrapped.with_cache(OracleCache::new(oracle.cache_ttl, oracle.cache_capacity));
        }
        Ok(wrapped)
    }

    pub fn with_cache(mut self, cache: OracleCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Limit outgoing calls per minute; zero disables the limit
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.limiter = NonZeroU32::new(requests_per_minute)
            .map(|rpm| RateLimiter::direct(Quota::per_minute(rpm)));
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_direct_match_limit(mut self, limit: usize) -> Self {
        self.direct_match_limit = limit;
        self
    }

    /// Name of the wrapped backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Number of cached replies, or `None` without a cache
    pub async fn cached_replies(&self) -> Option<u64> {
        match &self.cache {
            Some(cache) => Some(cache.size().await),
            None => None,
        }
    }

    /// Suggest extra search terms; falls back to `[query]`
    pub async fn enrich(&self, query: &str, corpus: &[String]) -> Reply {
        let key = oracle_cache_key(OracleCall::Enrich, query, corpus);
        if let Some(terms) = self.cached(&key).await {
            self.record(|m| m.record_enrich(true));
            return Reply::Answered(terms);
        }

        match self
            .call(|| self.backend.enrich_terms(query, corpus))
            .await
        {
            Ok(terms) => {
                debug!("Oracle enriched '{}' with {} terms", query, terms.len());
                self.store(key, &terms).await;
                self.record(|m| m.record_enrich(true));
                Reply::Answered(terms)
            }
            Err(e) => {
                warn!("Query enrichment failed, using original query: {}", e);
                self.record(|m| m.record_enrich(false));
                Reply::Fallback(vec![query.to_string()])
            }
        }
    }

    /// Pick record ids answering a query; falls back to no ids
    pub async fn direct_match(&self, query: &str, records: &[OracleRecord]) -> Reply {
        let context: Vec<String> = records
            .iter()
            .map(|r| format!("{}\u{1f}{}\u{1f}{}", r.id, r.name, r.description))
            .collect();
        let key = oracle_cache_key(OracleCall::DirectMatch, query, &context);
        if let Some(ids) = self.cached(&key).await {
            self.record(|m| m.record_direct_match(true));
            return Reply::Answered(ids);
        }

        match self
            .call(|| self.backend.rank_records(query, records))
            .await
        {
            Ok(mut ids) => {
                ids.truncate(self.direct_match_limit);
                debug!("Oracle matched {} records for '{}'", ids.len(), query);
                self.store(key, &ids).await;
                self.record(|m| m.record_direct_match(true));
                Reply::Answered(ids)
            }
            Err(e) => {
                warn!("Direct match failed, returning no matches: {}", e);
                self.record(|m| m.record_direct_match(false));
                Reply::Fallback(Vec::new())
            }
        }
    }

    async fn call<F, Fut>(&self, request: F) -> Result<Vec<String>, OracleError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<String>, OracleError>>,
    {
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                return Err(OracleError::RateLimited);
            }
        }

        let start = Instant::now();
        let result = request().await;
        let elapsed = start.elapsed().as_millis() as u64;
        self.record(|m| m.record_oracle_latency(elapsed));
        result
    }

    async fn cached(&self, key: &str) -> Option<Vec<String>> {
        let cache = self.cache.as_ref()?;
        let hit = cache.get(key).await?;
        self.record(|m| m.record_cache_hit());
        Some(hit)
    }

    async fn store(&self, key: String, values: &[String]) {
        if let Some(cache) = &self.cache {
            cache.set(key, values.to_vec()).await;
        }
    }

    fn record(&self, f: impl FnOnce(&Metrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}
