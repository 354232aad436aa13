//! Feature module core types
//!
//! Contains the per-test feature bundles and the OCR error type.

use thiserror::Error;

// ============================================================
// Error Types
// ============================================================

/// OCR invocation error types
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine unavailable")]
    Unavailable,

    #[error("OCR failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type OcrResult<T> = std::result::Result<T, OcrError>;

// ============================================================
// Feature Bundles
// ============================================================

/// Blank-page metrics and decision
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlankAnalysis {
    /// Grayscale standard deviation
    pub std_dev: f64,
    /// Intensity range (max - min)
    pub intensity_range: u8,
    /// Shannon entropy of the 256-bin intensity histogram (bits)
    pub entropy: f64,
    /// Fraction of pixels marked as edges by Canny
    pub edge_density: f64,
    /// Fraction of pixels above the very-light threshold
    pub very_light_ratio: f64,
    /// Mean intensity
    pub mean: f64,
    /// All six blank criteria hold
    pub is_blank: bool,
    /// Additive confidence (0 unless `is_blank`)
    pub confidence: f32,
}

/// OCR-derived text statistics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextAnalysis {
    /// More than three words recognized
    pub has_text: bool,
    /// Number of whitespace-separated words
    pub word_count: usize,
    /// Number of non-empty lines
    pub line_count: usize,
    /// Few short lines, typical of a title page
    pub is_centered_title: bool,
    /// min(word_count / 10, 1.0)
    pub confidence: f32,
}

/// Color and shape complexity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplexityAnalysis {
    /// Entropy of the 8x8x8 color histogram (bits)
    pub color_entropy: f64,
    /// Fraction of pixels marked as edges by Canny
    pub edge_density: f64,
    pub is_complex: bool,
}

/// Calibration-target detection result
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationAnalysis {
    /// Four-vertex polygons with area in the patch range
    pub rectangular_patches: usize,
    /// Rectangular patches with near-square bounding boxes
    pub regular_patches: usize,
    /// Mean pairwise distance between grid-cell mean colors, normalized to [0, 1]
    pub color_variety: f64,
    pub is_calibration: bool,
    /// Additive confidence (0 unless `is_calibration`)
    pub confidence: f32,
}

/// All content features for one image
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentFeatures {
    pub blank: BlankAnalysis,
    pub calibration: CalibrationAnalysis,
    pub text: TextAnalysis,
    pub complexity: ComplexityAnalysis,
}
