//! Query expansion module
//!
//! Turns a raw query into a set of lowercase search terms by adding:
//! - Lexicon synonyms of any token that is a keyword or a known synonym
//! - Every phrase of an intent when all words of one of its phrases
//!   loosely match the query tokens
//!
//! Matching of intent words is by substring in either direction and has
//! no minimum token length, so very short tokens can over-match.

use crate::lexicon::Lexicon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Deduplicated lowercase terms derived from one query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermSet {
    terms: BTreeSet<String>,
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a term, returning true if it was not present
    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        self.terms.insert(term.into())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms present in either set
    pub fn union(&self, other: &TermSet) -> TermSet {
        TermSet {
            terms: self.terms.union(&other.terms).cloned().collect(),
        }
    }

    /// Join the terms back into a whitespace separated query
    pub fn to_query(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for TermSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for TermSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.into_iter()
    }
}

/// Lowercase a query and split it on whitespace
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Expands queries using a shared lexicon
#[derive(Debug, Clone)]
pub struct QueryExpander {
    lexicon: Arc<Lexicon>,
}

impl QueryExpander {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Expander over the built-in lexicon
    pub fn builtin() -> Self {
        Self::new(Arc::new(Lexicon::builtin().clone()))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Expand a raw query into its term set
    pub fn expand(&self, query: &str) -> TermSet {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return TermSet::new();
        }

        let mut terms: TermSet = tokens.iter().cloned().collect();

        for token in &tokens {
            for (keyword, synonyms) in self.lexicon.synonym_entries() {
                if token == keyword || synonyms.iter().any(|s| s == token) {
                    terms.insert(keyword);
                    for synonym in synonyms.iter().filter(|s| *s != token) {
                        terms.insert(synonym.as_str());
                    }
                }
            }
        }

        for (intent, phrases) in self.lexicon.intent_entries() {
            if phrases.iter().any(|phrase| phrase_matches(phrase, &tokens)) {
                debug!("Query activated intent {}", intent);
                for phrase in phrases {
                    terms.insert(phrase.as_str());
                }
            }
        }

        debug!("Expanded {} tokens into {} terms", tokens.len(), terms.len());
        terms
    }
}

/// True when every word of the phrase loosely matches some token
fn phrase_matches(phrase: &str, tokens: &[String]) -> bool {
    let mut words = phrase.split_whitespace().peekable();
    if words.peek().is_none() {
        return false;
    }

    words.all(|word| {
        tokens
            .iter()
            .any(|token| token.contains(word) || word.contains(token.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> QueryExpander {
        QueryExpander::builtin()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  Picture   EDITOR "), vec!["picture", "editor"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_empty_query() {
        assert!(expander().expand("").is_empty());
        assert!(expander().expand(" \t ").is_empty());
    }

    #[test]
    fn test_raw_tokens_are_kept() {
        let terms = expander().expand("zebra crossing");
        assert!(terms.contains("zebra"));
        assert!(terms.contains("crossing"));
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn test_synonym_expansion() {
        let terms = expander().expand("picture");
        assert!(terms.contains("image"));
        assert!(terms.contains("photo"));
        assert!(terms.contains("visual"));
        assert!(terms.contains("picture"));
    }

    #[test]
    fn test_keyword_expansion() {
        let terms = expander().expand("Editor");
        for term in ["editor", "edit", "modify", "change", "adjust", "enhance"] {
            assert!(terms.contains(term), "missing {}", term);
        }
    }

    #[test]
    fn test_word_in_two_entries() {
        // "tool" is a generator synonym and a keyword of its own
        let terms = expander().expand("tool");
        assert!(terms.contains("generator"));
        assert!(terms.contains("utility"));
        assert!(terms.contains("maker"));
    }

    #[test]
    fn test_intent_adds_whole_phrase_set() {
        // "edit pictures" matches via edit ⊂ editor and picture ⊂ pictures
        let terms = expander().expand("picture editor");
        assert!(terms.contains("image editor"));
        assert!(terms.contains("photo editing"));
        assert!(terms.contains("retouch photo"));
        assert!(terms.contains("picture enhancement"));
    }

    #[test]
    fn test_intent_requires_every_word() {
        let terms = expander().expand("retouch");
        assert!(!terms.contains("image editor"));
    }

    #[test]
    fn test_short_tokens_over_match() {
        // Known looseness: "a" is contained in "art" and "ai"
        let terms = expander().expand("a");
        assert!(terms.contains("ai art"));
    }

    #[test]
    fn test_expansion_contains_previous_round() {
        let expander = expander();
        let first = expander.expand("picture editor");
        let second = expander.expand(&first.to_query());
        assert!(first.iter().all(|t| second.contains(t)));
    }

    #[test]
    fn test_repeated_expansion_reaches_fixed_point() {
        let expander = expander();
        let mut current = expander.expand("ai video maker");
        let mut stable = false;
        for _ in 0..10 {
            let next = expander.expand(&current.to_query());
            if next == current {
                stable = true;
                break;
            }
            current = next;
        }
        assert!(stable);
    }

    #[test]
    fn test_custom_lexicon() {
        let lexicon = Lexicon::from_yaml("synonyms:\n  music: [song]\n").unwrap();
        let expander = QueryExpander::new(Arc::new(lexicon));
        let terms = expander.expand("song");
        assert!(terms.contains("music"));
        assert!(!terms.contains("image"));
    }
}
