//! Page Classification module
//!
//! Assigns each scanned image a structural role with a confidence.
//!
//! # Features
//!
//! - Ordered filename pattern groups (cover, back cover, flyleaf, insert,
//!   reference, calibration) with position fallbacks
//! - Content cascade over blank, calibration, text and complexity features
//! - Asymmetric arbitration: filename wins only when strictly more confident
//! - Decode failures surface as [`ClassifyError::Decode`];
//!   [`PageClassifier::classify_or_fallback`] maps them to `(texto, 0.1)`
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::{PageClassifier, PageType};
//! use std::path::Path;
//!
//! let classifier = PageClassifier::without_ocr();
//! let result = classifier.classify_path(Path::new("IMG_0001_portada.jpg")).unwrap();
//! assert_eq!(result.page_type, PageType::Cover);
//! ```

// Submodules
mod arbitrate;
mod filename;
mod types;

// Re-export public API
pub use arbitrate::{ContentRule, PageClassifier, CONTENT_RULES, FILENAME_SHORT_CIRCUIT};
pub use filename::{
    FilenameMatcher, FIRST_POSITION_CONFIDENCE, NO_MATCH_CONFIDENCE, ROLE_MATCH_CONFIDENCE,
    ROLE_PATTERNS, SECOND_POSITION_CONFIDENCE,
};
pub use types::{
    Classification, ClassifyError, PageType, ParsePageTypeError, Result,
    DECODE_FAILURE_CONFIDENCE,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_ends_with_default() {
        let last = CONTENT_RULES.last().unwrap();
        assert_eq!(last.name, "default");
        assert_eq!(last.page_type, PageType::Text);
        assert!((last.confidence - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_role_pattern_group_order() {
        let order: Vec<PageType> = ROLE_PATTERNS.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            order,
            vec![
                PageType::Cover,
                PageType::BackCover,
                PageType::Flyleaf,
                PageType::Insert,
                PageType::Reference,
                PageType::CalibrationTarget,
            ]
        );
    }

    #[test]
    fn test_short_circuit_above_role_fallbacks() {
        assert!(ROLE_MATCH_CONFIDENCE > FILENAME_SHORT_CIRCUIT);
        assert!(FIRST_POSITION_CONFIDENCE < FILENAME_SHORT_CIRCUIT);
        assert!(SECOND_POSITION_CONFIDENCE < FILENAME_SHORT_CIRCUIT);
        assert!(DECODE_FAILURE_CONFIDENCE < NO_MATCH_CONFIDENCE);
    }

    #[test]
    fn test_error_types() {
        let _err1 = ClassifyError::ImageNotFound(std::path::PathBuf::from("/test"));
        let _err2 = ClassifyError::Decode("bad header".to_string());
        let _err3: ClassifyError = std::io::Error::other("test").into();
        let err = ParsePageTypeError("x".to_string());
        assert_eq!(err.to_string(), "Unknown page type: x");
    }
}
