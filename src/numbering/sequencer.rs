//! Page number assignment
//!
//! Every pass walks the catalog in filename order. The automatic pass is a
//! full re-derivation; the manual operations touch only what they name.

use regex::Regex;
use tracing::{debug, info};
use uuid::Uuid;

use super::structure::PageStructureAnalyzer;
use super::types::{
    ExceptionCandidate, NumberType, NumberingError, NumberingSummary, PageNumber, Result,
    EXCEPTION_SUFFIXES,
};
use crate::catalog::ImageCatalog;
use crate::classify::PageType;

/// Confidence reported for a filename-detected exception
pub const EXCEPTION_DETECTION_CONFIDENCE: f32 = 0.8;

/// Assigns and edits page numbers on a catalog
pub struct NumberingSequencer;

impl NumberingSequencer {
    /// Re-derive every page number from page types and filename order
    ///
    /// Clears number, number type and phantom flag on every record first.
    /// Numbered pages inside the preliminary range take Roman numerals until
    /// the table runs out, then continue with the Arabic counter.
    pub fn auto_number(catalog: &mut ImageCatalog) -> NumberingSummary {
        if catalog.is_empty() {
            debug!("Auto-number skipped: catalog is empty");
            return NumberingSummary::default();
        }

        let mut records = catalog.sorted_mut();
        let page_types: Vec<PageType> = records.iter().map(|r| r.page_type).collect();
        let structure = PageStructureAnalyzer::analyze(&page_types);

        let mut summary = NumberingSummary {
            structure,
            ..Default::default()
        };
        let mut roman_counter: u32 = 1;
        let mut arabic_counter: u32 = 1;

        for (index, record) in records.iter_mut().enumerate() {
            record.page_number = None;
            record.number_type = NumberType::Arabic;
            record.phantom_number = false;

            if !record.page_type.is_numbered() {
                summary.unnumbered += 1;
                continue;
            }

            let roman = structure
                .is_preliminary(index)
                .then(|| PageNumber::roman_at(roman_counter))
                .flatten();

            match roman {
                Some(numeral) => {
                    record.page_number = Some(numeral);
                    record.number_type = NumberType::Roman;
                    roman_counter += 1;
                    summary.roman_assigned += 1;
                }
                None => {
                    record.page_number = Some(PageNumber::Arabic(arabic_counter));
                    arabic_counter += 1;
                    summary.arabic_assigned += 1;
                }
            }
        }

        info!(
            "Numbered {} pages ({} roman, {} arabic), {} unnumbered",
            summary.roman_assigned + summary.arabic_assigned,
            summary.roman_assigned,
            summary.arabic_assigned,
            summary.unnumbered
        );

        summary
    }

    /// Renumber numbered pages from `start_id` onwards, starting at `start`
    ///
    /// Records before the start point are untouched. Roman numbering falls
    /// back to Arabic values past the end of the numeral table. Returns the
    /// number of records renumbered.
    pub fn renumber_from(
        catalog: &mut ImageCatalog,
        start_id: Uuid,
        start: u32,
        number_type: NumberType,
    ) -> Result<usize> {
        let mut records = catalog.sorted_mut();
        let start_index = records
            .iter()
            .position(|r| r.id == start_id)
            .ok_or(NumberingError::UnknownRecord(start_id))?;

        let mut current = start;
        let mut renumbered = 0;

        for record in records[start_index..].iter_mut() {
            if !record.page_type.is_numbered() {
                continue;
            }

            let value = match number_type {
                NumberType::Roman => PageNumber::roman_at(current),
                NumberType::Arabic => None,
            }
            .unwrap_or(PageNumber::Arabic(current));

            record.number_type = value.number_type();
            record.page_number = Some(value);
            current = current.saturating_add(1);
            renumbered += 1;
        }

        info!(
            "Renumbered {} pages from {} starting at {} ({})",
            renumbered, start_id, start, number_type
        );

        Ok(renumbered)
    }

    /// Give one record an explicit base number with an exception suffix
    ///
    /// No other record is shifted, so the base number may now appear twice.
    /// The record keeps its numbering system: a Roman page gets the numeral
    /// for `base` (Arabic past the end of the table).
    pub fn apply_exception(
        catalog: &mut ImageCatalog,
        id: Uuid,
        base: u32,
        suffix: &str,
    ) -> Result<()> {
        let record = catalog
            .get_mut(&id)
            .ok_or(NumberingError::UnknownRecord(id))?;

        let value = match record.number_type {
            NumberType::Roman => PageNumber::roman_at(base),
            NumberType::Arabic => None,
        }
        .unwrap_or(PageNumber::Arabic(base));

        record.page_number = Some(value);
        record.number_exception = Some(suffix.to_string());

        debug!("Exception {} {} applied to {}", base, suffix, record.original_filename);
        Ok(())
    }

    /// Mark one record with a number that is not printed on the page
    pub fn set_phantom_number(
        catalog: &mut ImageCatalog,
        id: Uuid,
        number: PageNumber,
    ) -> Result<()> {
        let record = catalog
            .get_mut(&id)
            .ok_or(NumberingError::UnknownRecord(id))?;

        record.number_type = number.number_type();
        record.page_number = Some(number);
        record.phantom_number = true;

        debug!("Phantom number set on {}", record.original_filename);
        Ok(())
    }

    /// Scan filenames for exception suffixes
    ///
    /// Candidates are reported in filename order and never applied.
    pub fn detect_exceptions(catalog: &ImageCatalog) -> Vec<ExceptionCandidate> {
        let patterns = exception_patterns();
        let mut candidates = Vec::new();

        for record in catalog.sorted() {
            let name = record.original_filename.to_lowercase();
            for (suffix, regexes) in &patterns {
                if regexes.iter().any(|re| re.is_match(&name)) {
                    candidates.push(ExceptionCandidate {
                        image_id: record.id,
                        filename: record.original_filename.clone(),
                        detected_exception: (*suffix).to_string(),
                        confidence: EXCEPTION_DETECTION_CONFIDENCE,
                    });
                }
            }
        }

        debug!("Detected {} exception candidates", candidates.len());
        candidates
    }
}

/// `\b<x>\b`, `_<x>` and `-<x>` for every known suffix
fn exception_patterns() -> Vec<(&'static str, Vec<Regex>)> {
    EXCEPTION_SUFFIXES
        .iter()
        .map(|suffix| {
            let regexes = [
                format!(r"\b{}\b", suffix),
                format!("_{}", suffix),
                format!("-{}", suffix),
            ]
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
            (*suffix, regexes)
        })
        .collect()
}
