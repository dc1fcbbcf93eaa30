//! Domain catalog: the add/list/remove workflow over a record store

use crate::domain::{format_domain, is_valid_domain};
use crate::storage::{DomainStore, Record};
use std::sync::Arc;
use tracing::{error, info};

/// Reasons a domain cannot be added
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Domain is required")]
    DomainRequired,

    #[error("Please enter a valid domain (e.g., example.com)")]
    InvalidDomain,

    #[error("Description is required")]
    DescriptionRequired,

    #[error("This domain already exists in your collection")]
    AlreadyExists,

    #[error("Failed to store domain: {0}")]
    Storage(String),
}

impl CatalogError {
    /// True for errors caused by the submitted input
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Catalog of domains backed by a store
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DomainStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DomainStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DomainStore> {
        &self.store
    }

    /// Snapshot of all records
    pub fn list(&self) -> Vec<Record> {
        self.store.list()
    }

    /// Snapshot of all records, read on the blocking pool
    pub async fn snapshot(&self) -> Vec<Record> {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.list()).await {
            Ok(records) => records,
            Err(e) => {
                error!("Reading domains failed: {}", e);
                vec![]
            }
        }
    }

    /// Validate, normalize and store a new domain
    pub fn add(&self, domain: &str, description: &str) -> Result<Record, CatalogError> {
        if domain.trim().is_empty() {
            return Err(CatalogError::DomainRequired);
        }
        if !is_valid_domain(domain) {
            return Err(CatalogError::InvalidDomain);
        }
        if description.trim().is_empty() {
            return Err(CatalogError::DescriptionRequired);
        }

        let name = format_domain(domain);
        let record = self
            .store
            .insert_unique(&name, description.trim())
            .map_err(|e| CatalogError::Storage(format!("{:#}", e)))?
            .ok_or(CatalogError::AlreadyExists)?;
        info!("Domain added: {}", record.name);
        Ok(record)
    }

    /// Remove a domain by id
    pub fn remove(&self, id: &str) -> Result<(), CatalogError> {
        self.store
            .remove(id)
            .map_err(|e| CatalogError::Storage(format!("{:#}", e)))?;
        info!("Domain removed: {}", id);
        Ok(())
    }
}
