//! Page Numbering module
//!
//! Print-accurate pagination for a classified book.
//!
//! # Features
//!
//! - Front matter / main content boundary detection
//! - Automatic Roman/Arabic numbering in filename order
//! - Renumber-from-point, exception suffixes ("23 bis") and phantom numbers
//! - Sequence validation with separate Arabic and Roman checks
//! - Filename scan for exception candidates
//!
//! # Example
//!
//! ```rust
//! use folio::{Classification, ImageCatalog, ImageRecord, NumberingSequencer, PageType, SequenceValidator};
//!
//! let mut catalog = ImageCatalog::new();
//! for (name, page_type) in [("a.jpg", PageType::Cover), ("b.jpg", PageType::Text)] {
//!     catalog.insert(ImageRecord::new(name, Classification::new(page_type, 0.9)));
//! }
//!
//! NumberingSequencer::auto_number(&mut catalog);
//! assert!(SequenceValidator::validate(&catalog).is_empty());
//! ```

// Submodules
mod sequencer;
mod structure;
mod types;
mod validate;

// Re-export public API
pub use sequencer::{NumberingSequencer, EXCEPTION_DETECTION_CONFIDENCE};
pub use structure::PageStructureAnalyzer;
pub use types::{
    format_roman_numeral, parse_roman_numeral, BookStructure, ExceptionCandidate, NumberType,
    NumberingError, NumberingSummary, PageNumber, ProblemKind, Result, SequenceProblem,
    EXCEPTION_SUFFIXES, ROMAN_NUMERALS,
};
pub use validate::SequenceValidator;
