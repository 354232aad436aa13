//! Catalog module core types
//!
//! Errors, ingestion metadata, manual edits and batch reports.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::classify::PageType;
use crate::numbering::{NumberType, NumberingSummary, PageNumber};

// ============================================================
// Constants
// ============================================================

/// Current catalog snapshot format version
pub const CATALOG_FORMAT_VERSION: u32 = 1;

/// Image extensions accepted by default (lowercase, no dot)
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tiff", "tif"];

// ============================================================
// Error Types
// ============================================================

/// Catalog error types
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Image not found: {0}")]
    UnknownRecord(Uuid),

    #[error("Unsupported catalog version: {0}")]
    UnsupportedVersion(u32),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

// ============================================================
// Image Metadata
// ============================================================

/// Facts about the source file, fixed at ingestion
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Detected container format ("jpeg", "png", ...)
    pub format: Option<String>,
    pub size_bytes: u64,
    /// Hex SHA-256 of the file contents
    pub sha256: String,
    pub source_path: Option<PathBuf>,
}

// ============================================================
// Manual Updates
// ============================================================

/// A manual edit: any subset of the mutable record fields
///
/// `None` leaves a field alone. `page_number` and `number_exception` use a
/// nested option so an edit can also clear them; in JSON an absent key leaves
/// the field alone and `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub page_type: Option<PageType>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<Option<PageNumber>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_type: Option<NumberType>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_exception: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phantom_number: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated: Option<bool>,
}

impl RecordUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn page_type(mut self, page_type: PageType) -> Self {
        self.page_type = Some(page_type);
        self
    }

    /// Set the page number; the number type follows unless set explicitly
    #[must_use]
    pub fn page_number(mut self, number: PageNumber) -> Self {
        self.page_number = Some(Some(number));
        self
    }

    #[must_use]
    pub fn clear_page_number(mut self) -> Self {
        self.page_number = Some(None);
        self
    }

    #[must_use]
    pub fn number_type(mut self, number_type: NumberType) -> Self {
        self.number_type = Some(number_type);
        self
    }

    /// Set the exception suffix; a blank suffix clears it
    #[must_use]
    pub fn number_exception(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into().trim().to_string();
        self.number_exception = Some((!suffix.is_empty()).then_some(suffix));
        self
    }

    #[must_use]
    pub fn clear_number_exception(mut self) -> Self {
        self.number_exception = Some(None);
        self
    }

    #[must_use]
    pub fn phantom_number(mut self, phantom: bool) -> Self {
        self.phantom_number = Some(phantom);
        self
    }

    #[must_use]
    pub fn validated(mut self, validated: bool) -> Self {
        self.validated = Some(validated);
        self
    }
}

/// A present key becomes `Some`, so a JSON `null` reaches us as `Some(None)`
fn present_or_null<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================
// Reports
// ============================================================

/// Outcome of applying one update to many records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkUpdateReport {
    pub updated: Vec<Uuid>,
    /// Ids with no record; skipped
    pub missing: Vec<Uuid>,
}

/// A file that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch ingestion
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Ids of the new records, in input order
    pub ingested: Vec<Uuid>,
    /// Records created with the decode fallback classification
    pub decode_fallbacks: usize,
    /// Files that could not be read
    pub failures: Vec<IngestFailure>,
    /// Files rejected by the extension filter
    pub skipped: Vec<PathBuf>,
    /// Auto-number pass run after the batch, if enabled
    pub numbering: Option<NumberingSummary>,
}

impl IngestReport {
    /// Whether every accepted file produced a record
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================
// Ingest Options
// ============================================================

/// Batch ingestion options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Accepted extensions, lowercase without the dot
    pub allowed_extensions: Vec<String>,
    /// Run the auto-number pass after the batch
    pub auto_number: bool,
    /// Worker threads for classification (None = rayon default)
    pub threads: Option<usize>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            auto_number: true,
            threads: None,
        }
    }
}

impl IngestOptions {
    /// Create a new options builder
    pub fn builder() -> IngestOptionsBuilder {
        IngestOptionsBuilder::default()
    }

    /// Whether a file extension passes the filter (case-insensitive)
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.allowed_extensions.iter().any(|e| *e == extension)
    }
}

/// Builder for IngestOptions
#[derive(Debug, Default)]
pub struct IngestOptionsBuilder {
    options: IngestOptions,
}

impl IngestOptionsBuilder {
    /// Replace the extension filter
    #[must_use]
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.options.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Set whether to auto-number after the batch
    #[must_use]
    pub fn auto_number(mut self, enabled: bool) -> Self {
        self.options.auto_number = enabled;
        self
    }

    /// Set worker thread count (0 = rayon default)
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.options.threads = (threads > 0).then_some(threads);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> IngestOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_update_builder() {
        let update = RecordUpdate::new()
            .page_type(PageType::Illustration)
            .page_number(PageNumber::Arabic(4))
            .validated(true);

        assert_eq!(update.page_type, Some(PageType::Illustration));
        assert_eq!(update.page_number, Some(Some(PageNumber::Arabic(4))));
        assert_eq!(update.validated, Some(true));
        assert_eq!(update.phantom_number, None);
        assert!(!update.is_empty());
        assert!(RecordUpdate::new().is_empty());
    }

    #[test]
    fn test_record_update_clear() {
        let update = RecordUpdate::new().clear_page_number().clear_number_exception();
        assert_eq!(update.page_number, Some(None));
        assert_eq!(update.number_exception, Some(None));
    }

    #[test]
    fn test_record_update_from_json() {
        let update: RecordUpdate =
            serde_json::from_str(r#"{"type": "inserto", "validated": true}"#).unwrap();
        assert_eq!(update.page_type, Some(PageType::Insert));
        assert_eq!(update.validated, Some(true));
        assert_eq!(update.page_number, None);
        assert_eq!(update.number_exception, None);
    }

    #[test]
    fn test_record_update_json_null_clears() {
        let update: RecordUpdate =
            serde_json::from_str(r#"{"page_number": null, "number_exception": null}"#).unwrap();
        assert_eq!(update.page_number, Some(None));
        assert_eq!(update.number_exception, Some(None));

        let update: RecordUpdate =
            serde_json::from_str(r#"{"page_number": "XII", "number_exception": "bis"}"#).unwrap();
        assert_eq!(update.page_number, Some(Some(PageNumber::Roman("XII".into()))));
        assert_eq!(update.number_exception, Some(Some("bis".to_string())));
    }

    #[test]
    fn test_record_update_json_round_trip() {
        let update = RecordUpdate::new().clear_page_number().validated(false);
        let json = serde_json::to_string(&update).unwrap();
        let back: RecordUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, update);
    }

    #[test]
    fn test_blank_exception_clears() {
        assert_eq!(RecordUpdate::new().number_exception("   ").number_exception, Some(None));
        assert_eq!(
            RecordUpdate::new().number_exception(" ter ").number_exception,
            Some(Some("ter".to_string()))
        );
    }

    #[test]
    fn test_default_extensions_lowercase() {
        for ext in DEFAULT_ALLOWED_EXTENSIONS {
            assert_eq!(ext, ext.to_lowercase());
            assert!(!ext.starts_with('.'));
        }
    }

    #[test]
    fn test_ingest_options_default() {
        let opts = IngestOptions::default();
        assert!(opts.auto_number);
        assert_eq!(opts.threads, None);
        assert!(opts.allows_extension("JPG"));
        assert!(opts.allows_extension(".tif"));
        assert!(!opts.allows_extension("gif"));
    }

    #[test]
    fn test_ingest_options_builder() {
        let opts = IngestOptions::builder()
            .allowed_extensions([".PNG", "webp"])
            .auto_number(false)
            .threads(4)
            .build();
        assert_eq!(opts.allowed_extensions, vec!["png", "webp"]);
        assert!(!opts.auto_number);
        assert_eq!(opts.threads, Some(4));

        let opts = IngestOptions::builder().threads(0).build();
        assert_eq!(opts.threads, None);
    }

    #[test]
    fn test_ingest_report_complete() {
        let mut report = IngestReport::default();
        assert!(report.is_complete());
        report.failures.push(IngestFailure {
            path: PathBuf::from("x.jpg"),
            reason: "unreadable".into(),
        });
        assert!(!report.is_complete());
    }

    #[test]
    fn test_error_types() {
        let _err1 = CatalogError::InputNotFound(PathBuf::from("/test"));
        let _err2 = CatalogError::UnknownRecord(Uuid::nil());
        let _err3 = CatalogError::Lock("poisoned".into());
        let _err4: CatalogError = std::io::Error::other("test").into();
        let err = CatalogError::UnsupportedVersion(9);
        assert_eq!(err.to_string(), "Unsupported catalog version: 9");
    }
}
