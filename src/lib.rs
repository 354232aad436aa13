//! folio - Scanned book page classifier and pagination sequencer
//!
//! Assigns each scanned page image a structural role and computes the page
//! number a printed book would carry.
//!
//! # Features
//!
//! - **Feature Extraction** ([`features`]) - Blank, text, complexity and calibration-target signals
//! - **Classification** ([`classify`]) - Filename patterns arbitrated against image content
//! - **Numbering** ([`numbering`]) - Roman preliminaries, Arabic body, exceptions and phantom numbers
//! - **Catalog** ([`catalog`]) - Record store, batch ingestion, snapshots and export naming
//! - **Configuration** ([`config`]) - TOML settings with CLI overrides
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use folio::{
//!     IngestOptions, Ingestor, NumberingSequencer, PageClassifier, SequenceValidator,
//!     SharedCatalog, SilentProgress,
//! };
//! use std::path::Path;
//!
//! let ingestor = Ingestor::new(PageClassifier::without_ocr(), IngestOptions::default());
//! let catalog = SharedCatalog::default();
//! ingestor.ingest(&catalog, Path::new("scans/"), &SilentProgress).unwrap();
//!
//! let mut book = catalog.write().unwrap();
//! NumberingSequencer::auto_number(&mut book);
//! for problem in SequenceValidator::validate(&book) {
//!     println!("{}", problem.message);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! image bytes -> FeatureExtractor + FilenameMatcher -> PageClassifier
//!                                                          |
//!                                                     ImageCatalog
//!                                                          |
//!              PageStructureAnalyzer -> NumberingSequencer -> SequenceValidator
//! ```
//!
//! # Error Handling
//!
//! Each module has its own error type:
//!
//! - [`OcrError`] - Text recognition failures (absorbed by the text test)
//! - [`ClassifyError`] - Missing or undecodable images
//! - [`NumberingError`] - Unknown record ids and invalid page numbers
//! - [`CatalogError`] - Snapshot, ingestion and lock errors
//! - [`ConfigError`] - Config file errors
//!
//! # License
//!
//! AGPL-3.0

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod features;
pub mod numbering;

pub use catalog::{
    copy_renamed, export_filename, rename_plan, rename_target, BulkUpdateReport, CatalogError,
    ImageCatalog, ImageMetadata, ImageRecord, IngestFailure, IngestOptions, IngestOptionsBuilder,
    IngestProgress, IngestReport, Ingestor, PreparedImage, RecordUpdate, RenameEntry,
    SharedCatalog, SilentProgress, CATALOG_FORMAT_VERSION, DEFAULT_ALLOWED_EXTENSIONS,
};
pub use classify::{
    Classification, ClassifyError, ContentRule, FilenameMatcher, PageClassifier, PageType,
    ParsePageTypeError, CONTENT_RULES, DECODE_FAILURE_CONFIDENCE, FILENAME_SHORT_CIRCUIT,
};
pub use cli::{
    CatalogArgs, ClassifyArgs, Cli, Commands, ExceptionArgs, ExitCode, ExportArgs, PhantomArgs,
    RenumberArgs, SetArgs, ValidateArgs,
};
pub use config::{CliOverrides, Config, ConfigError, IngestConfig, OcrConfig};
pub use features::{
    BlankAnalysis, BlankDetector, CalibrationAnalysis, CalibrationDetector, ComplexityAnalysis,
    ComplexityDetector, ContentFeatures, FeatureExtractor, NoOcr, OcrEngine, OcrError,
    TesseractOcr, TextAnalysis, TextDetector,
};
pub use numbering::{
    BookStructure, ExceptionCandidate, NumberType, NumberingError, NumberingSequencer,
    NumberingSummary, PageNumber, PageStructureAnalyzer, ProblemKind, SequenceProblem,
    SequenceValidator, ROMAN_NUMERALS,
};

/// Exit codes for the CLI
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const VALIDATION_FAILED: i32 = ExitCode::ValidationFailed as i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_public_types_accessible() {
        let _opts = IngestOptions::default();
        let _builder = IngestOptions::builder();
        let _catalog = ImageCatalog::new();
        let _shared = SharedCatalog::default();
        let _update = RecordUpdate::new();
        let _config = Config::default();
        let _overrides = CliOverrides::new();
        let _structure = BookStructure::default();
        let _err: Option<NumberingError> = None;
        let _err: Option<CatalogError> = None;
        let _err: Option<ClassifyError> = None;
        let _err: Option<ConfigError> = None;
        let _err: Option<OcrError> = None;
    }

    #[test]
    fn test_exit_codes_module() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_ne!(exit_codes::GENERAL_ERROR, 0);
        assert_ne!(exit_codes::INVALID_ARGS, 0);
        assert_ne!(exit_codes::INPUT_NOT_FOUND, 0);
        assert_ne!(exit_codes::VALIDATION_FAILED, 0);
    }

    #[test]
    fn test_exit_codes_match_enum() {
        assert_eq!(exit_codes::SUCCESS, ExitCode::Success.code());
        assert_eq!(exit_codes::GENERAL_ERROR, ExitCode::GeneralError.code());
        assert_eq!(exit_codes::INPUT_NOT_FOUND, ExitCode::InputNotFound.code());
        assert_eq!(exit_codes::VALIDATION_FAILED, ExitCode::ValidationFailed.code());
    }
}
