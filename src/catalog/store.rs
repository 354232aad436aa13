//! In-memory catalog and JSON snapshots

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use super::record::ImageRecord;
use super::types::{BulkUpdateReport, CatalogError, RecordUpdate, Result, CATALOG_FORMAT_VERSION};

/// Image records keyed by id
///
/// Mutating operations take `&mut self`; wrap in [`SharedCatalog`] to share
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    records: HashMap<Uuid, ImageRecord>,
}

/// On-disk snapshot
#[derive(Debug, Serialize, Deserialize)]
struct StoredCatalog {
    version: u32,
    records: Vec<ImageRecord>,
}

impl ImageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a record, returning its id
    pub fn insert(&mut self, record: ImageRecord) -> Uuid {
        let id = record.id;
        self.records.insert(id, record);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&ImageRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut ImageRecord> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.records.contains_key(id)
    }

    /// Records in filename order (ties broken by id)
    pub fn sorted(&self) -> Vec<&ImageRecord> {
        let mut records: Vec<&ImageRecord> = self.records.values().collect();
        records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        records
    }

    /// Mutable records in filename order (ties broken by id)
    pub fn sorted_mut(&mut self) -> Vec<&mut ImageRecord> {
        let mut records: Vec<&mut ImageRecord> = self.records.values_mut().collect();
        records.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        records
    }

    /// Apply a manual edit to one record
    pub fn update(&mut self, id: &Uuid, update: &RecordUpdate) -> Result<()> {
        let record = self
            .records
            .get_mut(id)
            .ok_or(CatalogError::UnknownRecord(*id))?;
        record.apply(update);
        debug!("Updated {}", record.original_filename);
        Ok(())
    }

    /// Apply one edit to many records; unknown ids are skipped and reported
    pub fn bulk_update(&mut self, ids: &[Uuid], update: &RecordUpdate) -> BulkUpdateReport {
        let mut report = BulkUpdateReport::default();
        for id in ids {
            match self.records.get_mut(id) {
                Some(record) => {
                    record.apply(update);
                    report.updated.push(*id);
                }
                None => report.missing.push(*id),
            }
        }
        if !report.missing.is_empty() {
            warn!("Bulk update skipped {} unknown ids", report.missing.len());
        }
        report
    }

    /// Serialize as a versioned JSON snapshot
    pub fn to_json(&self) -> Result<String> {
        let stored = StoredCatalog {
            version: CATALOG_FORMAT_VERSION,
            records: self.sorted().into_iter().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&stored)?)
    }

    /// Parse a JSON snapshot
    pub fn from_json(content: &str) -> Result<Self> {
        let stored: StoredCatalog = serde_json::from_str(content)?;
        if stored.version > CATALOG_FORMAT_VERSION {
            return Err(CatalogError::UnsupportedVersion(stored.version));
        }
        let records = stored.records.into_iter().map(|r| (r.id, r)).collect();
        Ok(Self { records })
    }

    /// Write a snapshot to `path`, creating parent directories
    pub fn save_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        debug!("Saved {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a snapshot from `path`
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::InputNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        debug!("Loaded {} records from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}

fn sort_key(record: &ImageRecord) -> (&str, Uuid) {
    (record.original_filename.as_str(), record.id)
}

// ============================================================
// Shared Handle
// ============================================================

/// Thread-safe catalog handle: one writer or many readers at a time
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<RwLock<ImageCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: ImageCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Shared read access
    pub fn read(&self) -> Result<RwLockReadGuard<'_, ImageCatalog>> {
        self.inner
            .read()
            .map_err(|e| CatalogError::Lock(format!("Lock error: {}", e)))
    }

    /// Exclusive access for a mutating pass
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, ImageCatalog>> {
        self.inner
            .write()
            .map_err(|e| CatalogError::Lock(format!("Lock error: {}", e)))
    }

    /// Clone of the current contents
    pub fn snapshot(&self) -> Result<ImageCatalog> {
        Ok(self.read()?.clone())
    }
}
