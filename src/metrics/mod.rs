//! Metrics collection module
//!
//! Tracks search volume, oracle outcomes and oracle latency.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Number of oracle latencies kept for the rolling average
const LATENCY_WINDOW: usize = 100;

/// Process-wide metrics collector
pub struct Metrics {
    local_searches: AtomicU64,
    orchestrated_searches: AtomicU64,
    suggestions: AtomicU64,
    enrich_successes: AtomicU64,
    enrich_fallbacks: AtomicU64,
    match_successes: AtomicU64,
    match_fallbacks: AtomicU64,
    cache_hits: AtomicU64,
    oracle_latencies: Mutex<VecDeque<u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            local_searches: AtomicU64::new(0),
            orchestrated_searches: AtomicU64::new(0),
            suggestions: AtomicU64::new(0),
            enrich_successes: AtomicU64::new(0),
            enrich_fallbacks: AtomicU64::new(0),
            match_successes: AtomicU64::new(0),
            match_fallbacks: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            oracle_latencies: Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW)),
        }
    }

    pub fn inc_local_search(&self) {
        self.local_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_orchestrated_search(&self) {
        self.orchestrated_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_suggestion(&self) {
        self.suggestions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of an enrichment call
    pub fn record_enrich(&self, success: bool) {
        let counter = if success {
            &self.enrich_successes
        } else {
            &self.enrich_fallbacks
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a direct-match call
    pub fn record_direct_match(&self, success: bool) {
        let counter = if success {
            &self.match_successes
        } else {
            &self.match_fallbacks
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an oracle round-trip time
    pub fn record_oracle_latency(&self, time_ms: u64) {
        if let Ok(mut times) = self.oracle_latencies.lock() {
            if times.len() >= LATENCY_WINDOW {
                times.pop_front();
            }
            times.push_back(time_ms);
        }
    }

    /// Average oracle round-trip time over the rolling window
    pub fn avg_oracle_latency(&self) -> Option<u64> {
        let times = self.oracle_latencies.lock().ok()?;
        if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<u64>() / times.len() as u64)
        }
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            local_searches: self.local_searches.load(Ordering::Relaxed),
            orchestrated_searches: self.orchestrated_searches.load(Ordering::Relaxed),
            suggestions: self.suggestions.load(Ordering::Relaxed),
            enrich_successes: self.enrich_successes.load(Ordering::Relaxed),
            enrich_fallbacks: self.enrich_fallbacks.load(Ordering::Relaxed),
            match_successes: self.match_successes.load(Ordering::Relaxed),
            match_fallbacks: self.match_fallbacks.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            avg_oracle_latency_ms: self.avg_oracle_latency(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable view of the metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub local_searches: u64,
    pub orchestrated_searches: u64,
    pub suggestions: u64,
    pub enrich_successes: u64,
    pub enrich_fallbacks: u64,
    pub match_successes: u64,
    pub match_fallbacks: u64,
    pub cache_hits: u64,
    pub avg_oracle_latency_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.inc_local_search();
        metrics.inc_orchestrated_search();
        metrics.record_enrich(true);
        metrics.record_enrich(false);
        metrics.record_direct_match(false);
        metrics.record_oracle_latency(100);
        metrics.record_oracle_latency(300);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.local_searches, 1);
        assert_eq!(snapshot.orchestrated_searches, 1);
        assert_eq!(snapshot.enrich_successes, 1);
        assert_eq!(snapshot.enrich_fallbacks, 1);
        assert_eq!(snapshot.match_fallbacks, 1);
        assert_eq!(snapshot.avg_oracle_latency_ms, Some(200));
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = Metrics::new();
        for _ in 0..LATENCY_WINDOW {
            metrics.record_oracle_latency(1000);
        }
        for _ in 0..LATENCY_WINDOW {
            metrics.record_oracle_latency(10);
        }
        assert_eq!(metrics.avg_oracle_latency(), Some(10));
    }
}
