//! Search module
//!
//! Local heuristic ranking, type-ahead suggestions, and the
//! oracle-augmented orchestrator built on top of them.

mod engine;
mod executor;
mod models;

pub use engine::SearchEngine;
pub use executor::{PendingSearch, Search};
pub use models::*;
