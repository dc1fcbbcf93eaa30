//! Oracle-augmented search orchestration

use super::engine::SearchEngine;
use super::models::SearchOutcome;
use crate::config::SearchSettings;
use crate::metrics::Metrics;
use crate::oracle::{Oracle, OracleRecord};
use crate::storage::Record;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Search executor combining local ranking with the oracle
///
/// Every call works on a caller-supplied record snapshot. Nothing here
/// is mutated per search except the generation counter.
pub struct Search {
    engine: Arc<SearchEngine>,
    oracle: Arc<Oracle>,
    metrics: Option<Arc<Metrics>>,
    settings: SearchSettings,
    generation: AtomicU64,
}

impl Search {
    /// Create a new search executor
    pub fn new(engine: SearchEngine, oracle: Oracle) -> Self {
        Self {
            engine: Arc::new(engine),
            oracle: Arc::new(oracle),
            metrics: None,
            settings: SearchSettings::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Local search only
    pub fn search(&self, records: &[Record], query: &str) -> Vec<Record> {
        if let Some(metrics) = &self.metrics {
            metrics.inc_local_search();
        }
        self.engine.search(records, query)
    }

    /// Suggestions capped at `limit`, or the configured limit
    pub fn suggest(&self, records: &[Record], query: &str, limit: Option<usize>) -> Vec<Record> {
        if let Some(metrics) = &self.metrics {
            metrics.inc_suggestion();
        }
        let limit = limit.unwrap_or(self.settings.suggestion_limit);
        self.engine.suggest(records, query, limit)
    }

    /// Start an orchestrated search
    ///
    /// The local result is computed immediately and is available from the
    /// returned handle before any oracle call is made.
    pub fn begin(&self, records: Vec<Record>, query: impl Into<String>) -> PendingSearch<'_> {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(metrics) = &self.metrics {
            metrics.inc_orchestrated_search();
        }

        let local = self.engine.search(&records, &query);
        debug!(
            "Search #{} '{}' has {} local results",
            generation,
            query,
            local.len()
        );

        PendingSearch {
            search: self,
            records,
            query,
            local,
            generation,
        }
    }

    /// Run an orchestrated search to completion
    pub async fn execute(&self, records: Vec<Record>, query: &str) -> Vec<Record> {
        self.begin(records, query).resolve().await
    }

    /// Most recently issued generation number
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether `generation` is the newest search started on this executor
    pub fn is_latest(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }
}

/// An orchestrated search whose local result is ready
pub struct PendingSearch<'a> {
    search: &'a Search,
    records: Vec<Record>,
    query: String,
    local: Vec<Record>,
    generation: u64,
}

impl<'a> PendingSearch<'a> {
    /// Local result, available before the oracle is consulted
    pub fn local(&self) -> &[Record] {
        &self.local
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Finish the search and return the merged records
    pub async fn resolve(self) -> Vec<Record> {
        self.resolve_detailed().await.records
    }

    /// Finish the search and return the merged records with details
    pub async fn resolve_detailed(self) -> SearchOutcome {
        let search = self.search;
        let settings = &search.settings;
        let trimmed = self.query.trim();
        let local_count = self.local.len();

        let mut outcome = SearchOutcome {
            generation: self.generation,
            local_count,
            ..Default::default()
        };

        if trimmed.is_empty() {
            outcome.records = self.local;
            return outcome;
        }

        let mut candidates = self.local;

        if trimmed.chars().count() > settings.enrichment_min_chars {
            let corpus: Vec<String> = self
                .records
                .iter()
                .map(|r| r.description.clone())
                .collect();
            let reply = search.oracle.enrich(&self.query, &corpus).await;
            outcome.enrichment_used = !reply.is_fallback();
            outcome.enriched_terms = reply.into_values();

            let enriched_query = format!("{} {}", self.query, outcome.enriched_terms.join(" "));
            candidates = search.engine.search(&self.records, &enriched_query);
        }

        if candidates.len() < settings.direct_match_threshold {
            let summaries: Vec<OracleRecord> = self
                .records
                .iter()
                .map(|r| OracleRecord {
                    id: r.id.clone(),
                    name: r.name.clone(),
                    description: r.description.clone(),
                })
                .collect();
            let reply = search.oracle.direct_match(&self.query, &summaries).await;
            outcome.direct_match_used = !reply.is_fallback();
            outcome.oracle_ids = reply.into_values();
        }

        outcome.records = merge(&self.records, candidates, &outcome.oracle_ids);

        info!(
            "Search #{}: {} local, {} merged",
            self.generation,
            local_count,
            outcome.records.len()
        );

        outcome
    }
}

/// Candidates first, then oracle ids resolved against the snapshot
///
/// Duplicates keep their first position. Ids with no matching record
/// are dropped.
fn merge(records: &[Record], candidates: Vec<Record>, oracle_ids: &[String]) -> Vec<Record> {
    let by_id: HashMap<&str, &Record> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::with_capacity(candidates.len() + oracle_ids.len());

    for record in candidates {
        if seen.insert(record.id.clone()) {
            merged.push(record);
        }
    }

    for id in oracle_ids {
        match by_id.get(id.as_str()) {
            Some(record) => {
                if seen.insert(id.clone()) {
                    merged.push((*record).clone());
                }
            }
            None => debug!("Dropping unknown oracle id: {}", id),
        }
    }

    merged
}
