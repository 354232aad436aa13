//! Blank page detection
//!
//! A page is blank only when every intensity statistic agrees: low spread,
//! low histogram entropy, almost no edges, and a bright, mostly very-light
//! surface. The confidence is scored separately against stricter thresholds
//! so that a barely-blank page reports less certainty than a pristine one.

use image::GrayImage;

use super::edge_density;
use super::types::BlankAnalysis;

// ============================================================
// Constants
// ============================================================

/// Pixels above this value count as "very light"
pub const VERY_LIGHT_THRESHOLD: u8 = 240;

const MAX_STD_DEV: f64 = 5.0;
const MAX_RANGE: u8 = 50;
const MAX_ENTROPY: f64 = 3.0;
const MAX_EDGE_DENSITY: f64 = 0.001;
const MIN_VERY_LIGHT_RATIO: f64 = 0.9;
const MIN_MEAN: f64 = 230.0;

/// Confidence thresholds and their contributions
const CONF_STD_DEV: (f64, f32) = (2.0, 0.2);
const CONF_RANGE: (u8, f32) = (20, 0.15);
const CONF_ENTROPY: (f64, f32) = (2.0, 0.2);
const CONF_EDGE_DENSITY: (f64, f32) = (0.0005, 0.2);
const CONF_VERY_LIGHT: (f64, f32) = (0.95, 0.2);
const CONF_MEAN: (f64, f32) = (245.0, 0.15);

/// Upper bound of the blank confidence
pub const MAX_BLANK_CONFIDENCE: f32 = 0.95;

// ============================================================
// Blank Detector
// ============================================================

/// Blank-page test over a grayscale image
pub struct BlankDetector;

impl BlankDetector {
    /// Measure the image and decide whether it is blank
    pub fn analyze(gray: &GrayImage) -> BlankAnalysis {
        let total = (gray.width() as u64 * gray.height() as u64) as f64;
        if total == 0.0 {
            return BlankAnalysis::default();
        }

        let mut histogram = [0u64; 256];
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut min = u8::MAX;
        let mut max = u8::MIN;

        for pixel in gray.pixels() {
            let v = pixel.0[0];
            histogram[v as usize] += 1;
            sum += v as f64;
            sum_sq += (v as f64) * (v as f64);
            min = min.min(v);
            max = max.max(v);
        }

        let mean = sum / total;
        let variance = (sum_sq / total - mean * mean).max(0.0);
        let very_light: u64 = histogram[(VERY_LIGHT_THRESHOLD as usize + 1)..].iter().sum();

        Self::from_metrics(
            variance.sqrt(),
            max - min,
            histogram_entropy(&histogram, total),
            edge_density(gray),
            very_light as f64 / total,
            mean,
        )
    }

    /// Apply the blank decision and confidence scoring to raw metrics
    pub fn from_metrics(
        std_dev: f64,
        intensity_range: u8,
        entropy: f64,
        edge_density: f64,
        very_light_ratio: f64,
        mean: f64,
    ) -> BlankAnalysis {
        let is_blank = std_dev < MAX_STD_DEV
            && intensity_range < MAX_RANGE
            && entropy < MAX_ENTROPY
            && edge_density < MAX_EDGE_DENSITY
            && very_light_ratio > MIN_VERY_LIGHT_RATIO
            && mean > MIN_MEAN;

        let confidence = if is_blank {
            let mut score = 0.0f32;
            if std_dev < CONF_STD_DEV.0 {
                score += CONF_STD_DEV.1;
            }
            if intensity_range < CONF_RANGE.0 {
                score += CONF_RANGE.1;
            }
            if entropy < CONF_ENTROPY.0 {
                score += CONF_ENTROPY.1;
            }
            if edge_density < CONF_EDGE_DENSITY.0 {
                score += CONF_EDGE_DENSITY.1;
            }
            if very_light_ratio > CONF_VERY_LIGHT.0 {
                score += CONF_VERY_LIGHT.1;
            }
            if mean > CONF_MEAN.0 {
                score += CONF_MEAN.1;
            }
            score.min(MAX_BLANK_CONFIDENCE)
        } else {
            0.0
        };

        BlankAnalysis {
            std_dev,
            intensity_range,
            entropy,
            edge_density,
            very_light_ratio,
            mean,
            is_blank,
            confidence,
        }
    }
}

/// Shannon entropy (bits) of a histogram with `total` samples
pub(crate) fn histogram_entropy(histogram: &[u64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
