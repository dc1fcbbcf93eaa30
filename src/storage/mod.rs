//! Domain record storage
//!
//! Records are kept either in memory or in a single JSON file holding
//! the whole collection. The search subsystem only ever reads a
//! snapshot through [`DomainStore::list`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, error};
use uuid::Uuid;

/// A stored domain entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque unique identifier
    pub id: String,
    /// Normalized domain name
    #[serde(rename = "domain")]
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Creation time, stored as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a record with a fresh id and the current time
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    /// Replace the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Storage collaborator for domain records
pub trait DomainStore: Send + Sync {
    /// All records in insertion order
    fn list(&self) -> Vec<Record>;

    /// Store a new record
    fn insert(&self, name: &str, description: &str) -> Result<Record>;

    /// Store a new record unless the name is already taken
    ///
    /// The check and the write happen under one lock. Returns `None`
    /// when a record with the same name (case-insensitive) exists.
    fn insert_unique(&self, name: &str, description: &str) -> Result<Option<Record>>;

    /// Delete a record by id; unknown ids are ignored
    fn remove(&self, id: &str) -> Result<()>;

    /// Check whether a domain name is already stored (case-insensitive)
    fn exists(&self, name: &str) -> bool {
        contains_name(&self.list(), name)
    }
}

/// Volatile in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl DomainStore for MemoryStore {
    fn list(&self) -> Vec<Record> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn insert(&self, name: &str, description: &str) -> Result<Record> {
        let record = Record::new(name, description);
        self.records
            .write()
            .map_err(|_| anyhow::anyhow!("Record store lock poisoned"))?
            .push(record.clone());
        Ok(record)
    }

    fn insert_unique(&self, name: &str, description: &str) -> Result<Option<Record>> {
        let mut records = self
            .records
            .write()
            .map_err(|_| anyhow::anyhow!("Record store lock poisoned"))?;
        if contains_name(&records, name) {
            return Ok(None);
        }
        let record = Record::new(name, description);
        records.push(record.clone());
        Ok(Some(record))
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.records
            .write()
            .map_err(|_| anyhow::anyhow!("Record store lock poisoned"))?
            .retain(|r| r.id != id);
        Ok(())
    }
}

fn contains_name(records: &[Record], name: &str) -> bool {
    let name = name.to_lowercase();
    records.iter().any(|r| r.name.to_lowercase() == name)
}

/// Store persisting the whole collection as one JSON array
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored collection; a missing file is an empty catalog
    ///
    /// Unreadable or unparseable files are errors, so writers never
    /// rebuild the file from a partial view.
    pub fn try_read_records(&self) -> Result<Vec<Record>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Error reading domains file {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Error parsing domains file {}", self.path.display()))
    }

    fn read_records(&self) -> Vec<Record> {
        self.try_read_records().unwrap_or_else(|e| {
            error!("{:#}", e);
            vec![]
        })
    }

    fn write_records(&self, records: &[Record]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Replace the file atomically via a sibling temp file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Saved {} domains to {}", records.len(), self.path.display());
        Ok(())
    }
}

impl DomainStore for JsonFileStore {
    fn list(&self) -> Vec<Record> {
        self.read_records()
    }

    fn insert(&self, name: &str, description: &str) -> Result<Record> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Record store lock poisoned"))?;

        let mut records = self.try_read_records()?;
        let record = Record::new(name, description);
        records.push(record.clone());
        self.write_records(&records)?;

        Ok(record)
    }

    fn insert_unique(&self, name: &str, description: &str) -> Result<Option<Record>> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Record store lock poisoned"))?;

        let mut records = self.try_read_records()?;
        if contains_name(&records, name) {
            return Ok(None);
        }
        let record = Record::new(name, description);
        records.push(record.clone());
        self.write_records(&records)?;

        Ok(Some(record))
    }

    fn remove(&self, id: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Record store lock poisoned"))?;

        let mut records = self.try_read_records()?;
        records.retain(|r| r.id != id);
        self.write_records(&records)
    }
}
