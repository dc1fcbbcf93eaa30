//! Local heuristic search over a record snapshot

use super::models::ScoredRecord;
use crate::config::SearchSettings;
use crate::lexicon::Lexicon;
use crate::query::{QueryExpander, TermSet};
use crate::scoring::RelevanceScorer;
use crate::storage::Record;
use std::sync::Arc;
use tracing::debug;

/// Expands, scores and ranks records for a query
#[derive(Debug, Clone)]
pub struct SearchEngine {
    expander: QueryExpander,
    scorer: RelevanceScorer,
    min_suggestion_chars: usize,
}

impl SearchEngine {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            expander: QueryExpander::new(lexicon.clone()),
            scorer: RelevanceScorer::new(lexicon),
            min_suggestion_chars: SearchSettings::default().min_suggestion_chars,
        }
    }

    /// Engine over the built-in lexicon
    pub fn builtin() -> Self {
        Self::new(Arc::new(Lexicon::builtin().clone()))
    }

    pub fn with_settings(mut self, settings: &SearchSettings) -> Self {
        self.min_suggestion_chars = settings.min_suggestion_chars;
        self
    }

    /// Expand a query into its term set
    pub fn expand(&self, query: &str) -> TermSet {
        self.expander.expand(query)
    }

    /// Rank records for a query, best first
    ///
    /// An empty or whitespace-only query returns every record in its
    /// original order. Otherwise records scoring zero are dropped and the
    /// rest are stable-sorted by descending score.
    pub fn search(&self, records: &[Record], query: &str) -> Vec<Record> {
        if query.trim().is_empty() {
            return records.to_vec();
        }

        self.ranked(records, query)
            .into_iter()
            .map(|scored| scored.record)
            .collect()
    }

    /// Like [`search`](Self::search) but keeps the scores
    ///
    /// An empty query yields no scored records.
    pub fn ranked(&self, records: &[Record], query: &str) -> Vec<ScoredRecord> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let terms = self.expander.expand(query);
        let prepared = self.scorer.prepare(&terms);

        let mut scored: Vec<ScoredRecord> = records
            .iter()
            .filter_map(|record| {
                let score = self.scorer.score(record, &prepared);
                (score > 0).then(|| ScoredRecord {
                    record: record.clone(),
                    score,
                })
            })
            .collect();

        // sort_by is stable: ties keep snapshot order
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            "Query '{}' expanded to {} terms, {} of {} records matched",
            query,
            terms.len(),
            scored.len(),
            records.len()
        );

        scored
    }

    /// Top matches for type-ahead
    ///
    /// Queries shorter than the minimum suggestion length (in characters,
    /// after trimming) return nothing.
    pub fn suggest(&self, records: &[Record], query: &str, limit: usize) -> Vec<Record> {
        let trimmed = query.trim();
        if trimmed.is_empty() || trimmed.chars().count() < self.min_suggestion_chars {
            return Vec::new();
        }

        let mut results = self.search(records, query);
        results.truncate(limit);
        results
    }
}
