//! Application state shared across handlers

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::metrics::Metrics;
use crate::search::Search;
use crate::storage::DomainStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Domain catalog
    pub catalog: Catalog,
    /// Search executor
    pub search: Arc<Search>,
    /// Metrics collector
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        settings: Settings,
        store: Arc<dyn DomainStore>,
        search: Search,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            catalog: Catalog::new(store),
            search: Arc::new(search),
            metrics,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
