//! Domain Discovery: a private catalog of web domains with
//! natural-language search
//!
//! Queries are expanded through a keyword lexicon, records are ranked by
//! additive relevance rules, and an optional remote oracle can enrich
//! queries or pick matches directly. Every oracle failure degrades to
//! local search.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod lexicon;
pub mod metrics;
pub mod network;
pub mod oracle;
pub mod query;
pub mod scoring;
pub mod search;
pub mod storage;
pub mod web;

pub use catalog::{Catalog, CatalogError};
pub use config::Settings;
pub use lexicon::Lexicon;
pub use oracle::Oracle;
pub use search::{Search, SearchEngine, SearchOutcome};
pub use storage::{DomainStore, Record};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
