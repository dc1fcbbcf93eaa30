//! Search result models

use crate::storage::Record;
use serde::Serialize;

/// A record with its relevance score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub score: u32,
}

/// Full result of an orchestrated search
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    /// Generation this outcome belongs to
    pub generation: u64,
    /// Merged results, best first
    pub records: Vec<Record>,
    /// Number of records in the initial local result
    pub local_count: usize,
    /// Terms returned by enrichment (or its fallback)
    pub enriched_terms: Vec<String>,
    /// Ids returned by direct matching, in oracle order
    pub oracle_ids: Vec<String>,
    /// Enrichment answered without falling back
    pub enrichment_used: bool,
    /// Direct matching answered without falling back
    pub direct_match_used: bool,
}

impl SearchOutcome {
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}
