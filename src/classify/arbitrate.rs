//! Classification arbitration
//!
//! Merges filename evidence with visual-content evidence into one decision.
//!
//! # Algorithm
//!
//! 1. Filename match; above 0.8 it is returned without looking at pixels
//! 2. Blank test, then calibration test, each decisive on its own
//! 3. Otherwise the ordered [`CONTENT_RULES`] table over text, complexity
//!    and light-ratio signals; the first matching rule wins
//! 4. The filename result replaces the content result only when its
//!    confidence is strictly greater (ties go to content)

use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use super::filename::FilenameMatcher;
use super::types::{Classification, ClassifyError, PageType, Result};
use crate::features::{ContentFeatures, FeatureExtractor, NoOcr, OcrEngine};

// ============================================================
// Constants
// ============================================================

/// Filename confidence above which content analysis is skipped
pub const FILENAME_SHORT_CIRCUIT: f32 = 0.8;

/// Light-pixel ratio above which a textless, simple page is a flyleaf
const FLYLEAF_LIGHT_RATIO: f64 = 0.8;

/// Word-count bounds used by the content rules
const ILLUSTRATION_MAX_WORDS: usize = 10;
const TEXT_MIN_WORDS: usize = 10;

// ============================================================
// Content Rule Table
// ============================================================

/// One entry of the content cascade
#[derive(Debug, Clone, Copy)]
pub struct ContentRule {
    pub name: &'static str,
    pub applies: fn(&ContentFeatures) -> bool,
    pub page_type: PageType,
    pub confidence: f32,
}

fn centered_title(f: &ContentFeatures) -> bool {
    f.text.is_centered_title && !f.complexity.is_complex
}

fn complex_with_little_text(f: &ContentFeatures) -> bool {
    f.complexity.is_complex && f.text.word_count < ILLUSTRATION_MAX_WORDS
}

fn substantial_text(f: &ContentFeatures) -> bool {
    f.text.has_text && f.text.word_count > TEXT_MIN_WORDS
}

fn light_and_empty(f: &ContentFeatures) -> bool {
    !f.text.has_text
        && !f.complexity.is_complex
        && f.blank.very_light_ratio > FLYLEAF_LIGHT_RATIO
}

fn always(_: &ContentFeatures) -> bool {
    true
}

/// Content cascade, evaluated in order
pub const CONTENT_RULES: &[ContentRule] = &[
    ContentRule {
        name: "centered-title",
        applies: centered_title,
        page_type: PageType::Frontispiece,
        confidence: 0.7,
    },
    ContentRule {
        name: "complex-little-text",
        applies: complex_with_little_text,
        page_type: PageType::Illustration,
        confidence: 0.6,
    },
    ContentRule {
        name: "substantial-text",
        applies: substantial_text,
        page_type: PageType::Text,
        confidence: 0.7,
    },
    ContentRule {
        name: "light-and-empty",
        applies: light_and_empty,
        page_type: PageType::Flyleaf,
        confidence: 0.6,
    },
    ContentRule {
        name: "default",
        applies: always,
        page_type: PageType::Text,
        confidence: 0.4,
    },
];

// ============================================================
// Page Classifier
// ============================================================

/// Classifies scanned pages from filename and content
#[derive(Clone)]
pub struct PageClassifier {
    matcher: FilenameMatcher,
    ocr: Arc<dyn OcrEngine>,
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::without_ocr()
    }
}

impl PageClassifier {
    /// Create a classifier using the given OCR engine
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            matcher: FilenameMatcher::new(),
            ocr,
        }
    }

    /// Create a classifier whose text test always reports no text
    pub fn without_ocr() -> Self {
        Self::new(Arc::new(NoOcr))
    }

    /// Filename matcher in use
    pub fn filename_matcher(&self) -> &FilenameMatcher {
        &self.matcher
    }

    /// Classify a decoded image
    pub fn classify_image(&self, image: &DynamicImage, filename: &str) -> Classification {
        let by_name = self.matcher.classify(filename);
        if by_name.confidence > FILENAME_SHORT_CIRCUIT {
            debug!("{}: filename decides {} ({:.2})", filename, by_name.page_type, by_name.confidence);
            return by_name;
        }

        let by_content = self.classify_content(image);
        let decision = Self::arbitrate(by_name, by_content);
        debug!(
            "{}: filename {} ({:.2}), content {} ({:.2}) -> {}",
            filename,
            by_name.page_type,
            by_name.confidence,
            by_content.page_type,
            by_content.confidence,
            decision.page_type
        );
        decision
    }

    /// Classify from visual content only
    pub fn classify_content(&self, image: &DynamicImage) -> Classification {
        let extractor = FeatureExtractor::new(image);

        let blank = extractor.blank();
        if blank.is_blank {
            return Classification::new(PageType::Blank, blank.confidence);
        }

        let calibration = extractor.calibration();
        if calibration.is_calibration {
            return Classification::new(PageType::CalibrationTarget, calibration.confidence);
        }

        let features = ContentFeatures {
            blank,
            calibration,
            text: extractor.text(self.ocr.as_ref()),
            complexity: extractor.complexity(),
        };
        Self::apply_rules(&features)
    }

    /// Evaluate the content cascade over extracted features
    pub fn apply_rules(features: &ContentFeatures) -> Classification {
        CONTENT_RULES
            .iter()
            .find(|rule| (rule.applies)(features))
            .map(|rule| Classification::new(rule.page_type, rule.confidence))
            .unwrap_or_else(|| Classification::new(PageType::Text, 0.4))
    }

    /// Pick between filename and content results; ties go to content
    pub fn arbitrate(by_name: Classification, by_content: Classification) -> Classification {
        if by_name.confidence > by_content.confidence {
            by_name
        } else {
            by_content
        }
    }

    /// Decode image bytes in any supported format
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| ClassifyError::Decode(e.to_string()))
    }

    /// Decode image bytes and classify them
    pub fn classify_bytes(&self, bytes: &[u8], filename: &str) -> Result<Classification> {
        let image = Self::decode(bytes)?;
        Ok(self.classify_image(&image, filename))
    }

    /// Open an image file and classify it under its own filename
    pub fn classify_path(&self, path: &Path) -> Result<Classification> {
        if !path.exists() {
            return Err(ClassifyError::ImageNotFound(path.to_path_buf()));
        }
        let image = image::open(path).map_err(|e| ClassifyError::Decode(e.to_string()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.classify_image(&image, &filename))
    }

    /// Classify image bytes, degrading decode failures to the fallback result
    pub fn classify_or_fallback(&self, bytes: &[u8], filename: &str) -> Classification {
        Self::or_fallback(self.classify_bytes(bytes, filename), filename)
    }

    /// The one place a classification failure becomes `(texto, 0.1)`
    pub fn or_fallback(result: Result<Classification>, filename: &str) -> Classification {
        match result {
            Ok(classification) => classification,
            Err(e) => {
                warn!("{}: classification fell back to texto: {}", filename, e);
                Classification::decode_fallback()
            }
        }
    }
}
