//! Page Feature Extraction module
//!
//! Derives the quantitative signals used to classify a scanned page.
//!
//! # Features
//!
//! - Blank page test (intensity statistics, entropy, Canny edge density)
//! - Text presence test (OCR word/line counts, centered-title heuristic)
//! - Color/shape complexity test (8x8x8 color entropy, edge density)
//! - Calibration target test (rectangular patch contours, grid color variety)
//!
//! Every test is independent and returns a definite boolean plus its own
//! confidence. None of them fail: an OCR error degrades to "no text".
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::{FeatureExtractor, NoOcr};
//!
//! let image = image::open("scan_0007.tif").unwrap();
//! let extractor = FeatureExtractor::new(&image);
//! let blank = extractor.blank();
//! println!("blank={} confidence={:.2}", blank.is_blank, blank.confidence);
//! let features = extractor.extract_all(&NoOcr);
//! println!("complex={}", features.complexity.is_complex);
//! ```

// Submodules
mod blank;
mod calibration;
mod complexity;
mod ocr;
mod text;
mod types;

// Re-export public API
pub use blank::{BlankDetector, MAX_BLANK_CONFIDENCE, VERY_LIGHT_THRESHOLD};
pub use calibration::{CalibrationDetector, MAX_CALIBRATION_CONFIDENCE};
pub use complexity::ComplexityDetector;
pub use ocr::{NoOcr, OcrEngine, TesseractOcr, DEFAULT_OCR_LANGUAGE, DEFAULT_TESSERACT_CMD};
pub use text::TextDetector;
pub use types::{
    BlankAnalysis, CalibrationAnalysis, ComplexityAnalysis, ContentFeatures, OcrError, OcrResult,
    TextAnalysis,
};

#[cfg(test)]
pub(crate) use ocr::FixedTextOcr;

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::edges::canny;

/// Canny hysteresis thresholds shared by every edge-based test
pub(crate) const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub(crate) const CANNY_HIGH_THRESHOLD: f32 = 150.0;

/// Fraction of pixels marked as edges by Canny
pub(crate) fn edge_density(gray: &GrayImage) -> f64 {
    let total = gray.width() as u64 * gray.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let edges = canny(gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);
    let count = edges.pixels().filter(|p| p.0[0] > 0).count();
    count as f64 / total as f64
}

/// Feature extractor over one decoded image
///
/// Converts to RGB and grayscale once; each test can then be run on demand.
pub struct FeatureExtractor<'a> {
    image: &'a DynamicImage,
    rgb: RgbImage,
    gray: GrayImage,
}

impl<'a> FeatureExtractor<'a> {
    /// Prepare an image for feature extraction
    pub fn new(image: &'a DynamicImage) -> Self {
        Self {
            image,
            rgb: image.to_rgb8(),
            gray: image.to_luma8(),
        }
    }

    /// Blank-page test
    pub fn blank(&self) -> BlankAnalysis {
        BlankDetector::analyze(&self.gray)
    }

    /// Calibration-target test
    pub fn calibration(&self) -> CalibrationAnalysis {
        CalibrationDetector::analyze(&self.rgb, &self.gray)
    }

    /// Text-presence test
    pub fn text(&self, ocr: &dyn OcrEngine) -> TextAnalysis {
        TextDetector::detect(self.image, ocr)
    }

    /// Color/shape complexity test
    pub fn complexity(&self) -> ComplexityAnalysis {
        ComplexityDetector::analyze(&self.rgb, &self.gray)
    }

    /// Run every test
    pub fn extract_all(&self, ocr: &dyn OcrEngine) -> ContentFeatures {
        ContentFeatures {
            blank: self.blank(),
            calibration: self.calibration(),
            text: self.text(ocr),
            complexity: self.complexity(),
        }
    }

    /// Image dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }
}
