//! Numbering validation
//!
//! Re-derives the expected sequence for numbered pages and reports where the
//! catalog deviates. Arabic and Roman runs are checked independently.

use tracing::debug;

use super::types::{NumberType, PageNumber, ProblemKind, SequenceProblem, ROMAN_NUMERALS};
use crate::catalog::{ImageCatalog, ImageRecord};

/// Checks page numbers against the expected sequence
pub struct SequenceValidator;

impl SequenceValidator {
    /// Report every sequence break, Arabic run first, then Roman
    pub fn validate(catalog: &ImageCatalog) -> Vec<SequenceProblem> {
        let numbered: Vec<&ImageRecord> = catalog
            .sorted()
            .into_iter()
            .filter(|r| r.page_number.is_some() && r.page_type.is_numbered())
            .collect();

        let mut problems = Self::check_arabic(&numbered);
        problems.extend(Self::check_roman(&numbered));

        debug!(
            "Validated {} numbered pages: {} problems",
            numbered.len(),
            problems.len()
        );
        problems
    }

    /// An exception tag suppresses the report but still advances the counter
    fn check_arabic(numbered: &[&ImageRecord]) -> Vec<SequenceProblem> {
        let mut problems = Vec::new();

        let arabic = numbered
            .iter()
            .filter(|r| r.number_type == NumberType::Arabic);

        for (expected, record) in (1u32..).zip(arabic) {
            let Some(found) = &record.page_number else {
                continue;
            };
            if *found != PageNumber::Arabic(expected) && record.number_exception.is_none() {
                problems.push(SequenceProblem {
                    kind: ProblemKind::SequenceBreak,
                    image_id: record.id,
                    expected: expected.to_string(),
                    found: found.to_string(),
                    message: format!("Expected page {}, found {}", expected, found),
                });
            }
        }

        problems
    }

    /// Exception tags are not consulted for Roman pages
    fn check_roman(numbered: &[&ImageRecord]) -> Vec<SequenceProblem> {
        let mut problems = Vec::new();

        let roman = numbered
            .iter()
            .filter(|r| r.number_type == NumberType::Roman);

        for (position, record) in roman.enumerate() {
            let Some(found) = &record.page_number else {
                continue;
            };
            let expected = ROMAN_NUMERALS
                .get(position)
                .map(|numeral| (*numeral).to_string())
                .unwrap_or_else(|| format!(">{}", ROMAN_NUMERALS.len()));

            if *found != PageNumber::Roman(expected.clone()) {
                problems.push(SequenceProblem {
                    kind: ProblemKind::RomanSequenceBreak,
                    image_id: record.id,
                    message: format!("Expected roman {}, found {}", expected, found),
                    expected,
                    found: found.to_string(),
                });
            }
        }

        problems
    }
}
