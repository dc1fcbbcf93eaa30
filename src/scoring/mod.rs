//! Relevance scoring of domain records against expanded query terms
//!
//! The score is a plain sum of independent rules, each applied to every
//! term. Nothing is normalized or capped, so longer descriptions and
//! larger term sets produce larger scores.

use crate::lexicon::Lexicon;
use crate::query::TermSet;
use crate::storage::Record;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Points for a term found anywhere in the record text
pub const SUBSTRING_POINTS: u32 = 10;
/// Extra points for a term found in the domain name
pub const NAME_POINTS: u32 = 5;
/// Extra points for a term matching as a whole word
pub const WHOLE_WORD_POINTS: u32 = 5;
/// Points per matching three character window
pub const TRIGRAM_POINTS: u32 = 1;
/// Points per activated intent whose phrases appear in the record
pub const INTENT_POINTS: u32 = 15;

const TRIGRAM_LEN: usize = 3;

/// Named scoring rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    Substring,
    NameMatch,
    WholeWord,
    Trigram,
    Intent,
}

impl ScoringRule {
    pub fn all() -> [ScoringRule; 5] {
        [
            Self::Substring,
            Self::NameMatch,
            Self::WholeWord,
            Self::Trigram,
            Self::Intent,
        ]
    }
}

/// Per-rule contributions to a record's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub substring: u32,
    pub name_match: u32,
    pub whole_word: u32,
    pub trigram: u32,
    pub intent: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.substring + self.name_match + self.whole_word + self.trigram + self.intent
    }

    pub fn get(&self, rule: ScoringRule) -> u32 {
        match rule {
            ScoringRule::Substring => self.substring,
            ScoringRule::NameMatch => self.name_match,
            ScoringRule::WholeWord => self.whole_word,
            ScoringRule::Trigram => self.trigram,
            ScoringRule::Intent => self.intent,
        }
    }
}

/// A single term with its matchers compiled
#[derive(Debug, Clone)]
struct PreparedTerm {
    text: String,
    word: Option<Regex>,
    trigrams: Vec<String>,
}

impl PreparedTerm {
    fn new(text: &str) -> Self {
        let word = match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(text))) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Skipping whole-word matching for term {:?}: {}", text, e);
                None
            }
        };

        let chars: Vec<char> = text.chars().collect();
        let trigrams = if chars.len() >= TRIGRAM_LEN {
            chars
                .windows(TRIGRAM_LEN)
                .map(|w| w.iter().collect())
                .collect()
        } else {
            Vec::new()
        };

        Self {
            text: text.to_string(),
            word,
            trigrams,
        }
    }
}

/// Terms prepared once per query and reused for every record
#[derive(Debug, Clone, Default)]
pub struct PreparedTerms {
    terms: Vec<PreparedTerm>,
    /// Phrase sets of the intents activated by the query
    intents: Vec<Vec<String>>,
    intent_names: Vec<String>,
}

impl PreparedTerms {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Names of the intents the query activated
    pub fn activated_intents(&self) -> &[String] {
        &self.intent_names
    }
}

/// Record text as seen by the scorer
struct SearchableText {
    combined: String,
    name: String,
}

impl SearchableText {
    fn new(record: &Record) -> Self {
        Self {
            combined: format!("{} {}", record.name, record.description).to_lowercase(),
            name: record.name.to_lowercase(),
        }
    }
}

/// Computes relevance scores
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    lexicon: Arc<Lexicon>,
}

impl RelevanceScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Compile matchers and resolve activated intents for a term set
    pub fn prepare(&self, terms: &TermSet) -> PreparedTerms {
        let mut intents = Vec::new();
        let mut intent_names = Vec::new();

        for (name, phrases) in self.lexicon.intent_entries() {
            let activated = phrases.iter().any(|phrase| {
                terms
                    .iter()
                    .any(|term| phrase.contains(term) || term.contains(phrase.as_str()))
            });
            if activated {
                intents.push(phrases.to_vec());
                intent_names.push(name.to_string());
            }
        }

        PreparedTerms {
            terms: terms.iter().map(PreparedTerm::new).collect(),
            intents,
            intent_names,
        }
    }

    /// Score a record against prepared terms
    pub fn score(&self, record: &Record, prepared: &PreparedTerms) -> u32 {
        self.score_breakdown(record, prepared).total()
    }

    /// Score a record against a raw term set
    pub fn score_terms(&self, record: &Record, terms: &TermSet) -> u32 {
        self.score(record, &self.prepare(terms))
    }

    /// Per-rule score contributions for a record
    pub fn score_breakdown(&self, record: &Record, prepared: &PreparedTerms) -> ScoreBreakdown {
        let text = SearchableText::new(record);
        let mut breakdown = ScoreBreakdown::default();

        for term in &prepared.terms {
            breakdown.substring += substring_rule(&text, term);
            breakdown.name_match += name_rule(&text, term);
            breakdown.whole_word += whole_word_rule(&text, term);
            breakdown.trigram += trigram_rule(&text, term);
        }
        breakdown.intent = intent_rule(&text, &prepared.intents);

        breakdown
    }
}

fn substring_rule(text: &SearchableText, term: &PreparedTerm) -> u32 {
    if text.combined.contains(&term.text) {
        SUBSTRING_POINTS
    } else {
        0
    }
}

fn name_rule(text: &SearchableText, term: &PreparedTerm) -> u32 {
    if text.combined.contains(&term.text) && text.name.contains(&term.text) {
        NAME_POINTS
    } else {
        0
    }
}

/// Bonus when the term appears as a whole word
///
/// `\b` here is Unicode-aware, so letters such as `é` count as word
/// characters. ASCII-only boundaries would split `café` after `caf`
/// and credit the term `caf`; this rule does not.
fn whole_word_rule(text: &SearchableText, term: &PreparedTerm) -> u32 {
    match term.word {
        Some(ref re) if text.combined.contains(&term.text) && re.is_match(&text.combined) => {
            WHOLE_WORD_POINTS
        }
        _ => 0,
    }
}

/// Fuzzy partial-match credit, uncapped per term
fn trigram_rule(text: &SearchableText, term: &PreparedTerm) -> u32 {
    term.trigrams
        .iter()
        .filter(|gram| text.combined.contains(gram.as_str()))
        .count() as u32
        * TRIGRAM_POINTS
}

fn intent_rule(text: &SearchableText, intents: &[Vec<String>]) -> u32 {
    intents
        .iter()
        .filter(|phrases| phrases.iter().any(|p| text.combined.contains(p.as_str())))
        .count() as u32
        * INTENT_POINTS
}
