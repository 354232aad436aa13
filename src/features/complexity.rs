//! Color and shape complexity
//!
//! Illustrations tend to spread over many color buckets and carry dense
//! edge structure; text and blank pages do neither.

use image::{GrayImage, RgbImage};

use super::blank::histogram_entropy;
use super::edge_density;
use super::types::ComplexityAnalysis;

/// Buckets per channel in the color histogram
const BINS_PER_CHANNEL: usize = 8;

/// Width of one bucket in channel values
const BIN_WIDTH: u8 = (256 / BINS_PER_CHANNEL) as u8;

/// Color entropy above this is complex
const COMPLEX_ENTROPY: f64 = 12.0;

/// Edge density above this is complex
const COMPLEX_EDGE_DENSITY: f64 = 0.1;

/// Color/shape complexity test
pub struct ComplexityDetector;

impl ComplexityDetector {
    /// Measure color entropy and edge density
    pub fn analyze(rgb: &RgbImage, gray: &GrayImage) -> ComplexityAnalysis {
        Self::from_metrics(Self::color_entropy(rgb), edge_density(gray))
    }

    /// Apply the complexity decision to raw metrics
    pub fn from_metrics(color_entropy: f64, edge_density: f64) -> ComplexityAnalysis {
        ComplexityAnalysis {
            color_entropy,
            edge_density,
            is_complex: color_entropy > COMPLEX_ENTROPY || edge_density > COMPLEX_EDGE_DENSITY,
        }
    }

    /// Entropy (bits) of the 8x8x8 bucketed color histogram
    pub fn color_entropy(rgb: &RgbImage) -> f64 {
        let mut histogram = vec![0u64; BINS_PER_CHANNEL * BINS_PER_CHANNEL * BINS_PER_CHANNEL];
        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            let index = (r / BIN_WIDTH) as usize * BINS_PER_CHANNEL * BINS_PER_CHANNEL
                + (g / BIN_WIDTH) as usize * BINS_PER_CHANNEL
                + (b / BIN_WIDTH) as usize;
            histogram[index] += 1;
        }
        let total = (rgb.width() as u64 * rgb.height() as u64) as f64;
        histogram_entropy(&histogram, total)
    }
}
