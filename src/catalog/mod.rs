//! Image Catalog module
//!
//! The owned collection of image records that classification fills and
//! numbering edits.
//!
//! # Features
//!
//! - Fixed-shape [`ImageRecord`] with ingestion metadata (size, format, SHA-256)
//! - Filename-ordered views for every sequence operation
//! - Manual and bulk edits that never touch classification confidence
//! - Parallel batch ingestion with per-file failure isolation
//! - Versioned JSON snapshots
//! - Export and `Page_NNN` rename naming
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::{IngestOptions, Ingestor, PageClassifier, SharedCatalog, SilentProgress};
//! use std::path::Path;
//!
//! let ingestor = Ingestor::new(PageClassifier::without_ocr(), IngestOptions::default());
//! let catalog = SharedCatalog::default();
//! let report = ingestor.ingest(&catalog, Path::new("scans/"), &SilentProgress).unwrap();
//! println!("{} images ingested", report.ingested.len());
//! ```

// Submodules
mod export;
mod ingest;
mod record;
mod store;
mod types;

// Re-export public API
pub use export::{copy_renamed, export_filename, rename_plan, rename_target, RenameEntry};
pub use ingest::{IngestProgress, Ingestor, PreparedImage, SilentProgress};
pub use record::ImageRecord;
pub use store::{ImageCatalog, SharedCatalog};
pub use types::{
    BulkUpdateReport, CatalogError, ImageMetadata, IngestFailure, IngestOptions,
    IngestOptionsBuilder, IngestReport, RecordUpdate, Result, CATALOG_FORMAT_VERSION,
    DEFAULT_ALLOWED_EXTENSIONS,
};
