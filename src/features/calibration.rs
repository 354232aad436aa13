//! Calibration target detection (IT8, color checker charts)
//!
//! # Algorithm
//!
//! 1. Canny edge map, external contours only
//! 2. Douglas-Peucker approximation at 2% of the contour perimeter
//! 3. Four-vertex polygons within the patch area range are rectangular
//!    patches; those with a near-square bounding box are regular patches
//! 4. Independently, an 8x8 grid of cell mean colors measures how many
//!    distinct colors the page carries

use image::{GrayImage, RgbImage};
use imageproc::contours::find_contours;
use imageproc::edges::canny;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use super::types::CalibrationAnalysis;
use super::{CANNY_HIGH_THRESHOLD, CANNY_LOW_THRESHOLD};

// ============================================================
// Constants
// ============================================================

/// Polygon approximation tolerance relative to the perimeter
const APPROX_EPSILON_RATIO: f64 = 0.02;

/// Patch area range in square pixels
const MIN_PATCH_AREA: f64 = 500.0;
const MAX_PATCH_AREA: f64 = 50_000.0;

/// Bounding-box aspect ratio range for a regular patch
const MIN_REGULAR_ASPECT: f64 = 0.7;
const MAX_REGULAR_ASPECT: f64 = 1.3;

/// Grid used for the color variety measure
const GRID_CELLS: u32 = 8;

/// Distance that maps to full color variety
const VARIETY_NORMALIZER: f64 = 100.0;

/// Decision thresholds
const MIN_RECTANGULAR_PATCHES: usize = 10;
const MIN_REGULAR_PATCHES: usize = 8;
const MIN_COLOR_VARIETY: f64 = 0.7;

/// Confidence contributed by each satisfied threshold
const CONFIDENCE_STEP: f32 = 0.3;

/// Upper bound of the calibration confidence
pub const MAX_CALIBRATION_CONFIDENCE: f32 = 0.9;

// ============================================================
// Calibration Detector
// ============================================================

/// Calibration-target test
pub struct CalibrationDetector;

impl CalibrationDetector {
    /// Run the full calibration test
    pub fn analyze(rgb: &RgbImage, gray: &GrayImage) -> CalibrationAnalysis {
        let edges = canny(gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);
        let (rectangular, regular) = Self::count_patches(&edges);
        Self::from_metrics(rectangular, regular, Self::color_variety(rgb))
    }

    /// Apply the calibration decision and confidence scoring to raw metrics
    pub fn from_metrics(
        rectangular_patches: usize,
        regular_patches: usize,
        color_variety: f64,
    ) -> CalibrationAnalysis {
        let enough_rectangles = rectangular_patches >= MIN_RECTANGULAR_PATCHES;
        let enough_regular = regular_patches >= MIN_REGULAR_PATCHES;
        let varied = color_variety > MIN_COLOR_VARIETY;
        let is_calibration = enough_rectangles && enough_regular && varied;

        let confidence = if is_calibration {
            let score = [enough_rectangles, enough_regular, varied]
                .iter()
                .filter(|&&hit| hit)
                .count() as f32
                * CONFIDENCE_STEP;
            score.min(MAX_CALIBRATION_CONFIDENCE)
        } else {
            0.0
        };

        CalibrationAnalysis {
            rectangular_patches,
            regular_patches,
            color_variety,
            is_calibration,
            confidence,
        }
    }

    /// Count rectangular and regular patches among the external contours of
    /// a binary (edge) image
    pub fn count_patches(binary: &GrayImage) -> (usize, usize) {
        let mut rectangular = 0;
        let mut regular = 0;

        for contour in find_contours::<i32>(binary)
            .iter()
            .filter(|c| c.parent.is_none())
        {
            if contour.points.len() < 4 {
                continue;
            }

            let perimeter = arc_length(&contour.points, true);
            if perimeter <= 0.0 {
                continue;
            }

            let approx =
                approximate_polygon_dp(&contour.points, APPROX_EPSILON_RATIO * perimeter, true);
            if approx.len() != 4 {
                continue;
            }

            let area = polygon_area(&contour.points);
            if !(MIN_PATCH_AREA..=MAX_PATCH_AREA).contains(&area) {
                continue;
            }
            rectangular += 1;

            let aspect = bounding_box_aspect(&contour.points);
            if (MIN_REGULAR_ASPECT..=MAX_REGULAR_ASPECT).contains(&aspect) {
                regular += 1;
            }
        }

        (rectangular, regular)
    }

    /// Mean pairwise Euclidean distance between the mean colors of an 8x8
    /// grid of cells, divided by 100 and clamped to [0, 1]
    pub fn color_variety(rgb: &RgbImage) -> f64 {
        let cell_w = rgb.width() / GRID_CELLS;
        let cell_h = rgb.height() / GRID_CELLS;
        if cell_w == 0 || cell_h == 0 {
            return 0.0;
        }

        let mut means: Vec<[f64; 3]> = Vec::with_capacity((GRID_CELLS * GRID_CELLS) as usize);
        for gy in 0..GRID_CELLS {
            for gx in 0..GRID_CELLS {
                let mut sum = [0.0f64; 3];
                for y in gy * cell_h..(gy + 1) * cell_h {
                    for x in gx * cell_w..(gx + 1) * cell_w {
                        let p = rgb.get_pixel(x, y).0;
                        sum[0] += p[0] as f64;
                        sum[1] += p[1] as f64;
                        sum[2] += p[2] as f64;
                    }
                }
                let n = (cell_w * cell_h) as f64;
                means.push([sum[0] / n, sum[1] / n, sum[2] / n]);
            }
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        for (i, a) in means.iter().enumerate() {
            for b in &means[i + 1..] {
                let d = (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2);
                total += d.sqrt();
                pairs += 1;
            }
        }

        (total / pairs as f64 / VARIETY_NORMALIZER).clamp(0.0, 1.0)
    }
}

/// Shoelace area of a closed polygon
fn polygon_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    let twice: i64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
        })
        .sum();
    (twice as f64 / 2.0).abs()
}

/// Width / height of the axis-aligned bounding box
fn bounding_box_aspect(points: &[Point<i32>]) -> f64 {
    let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
    let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x + 1) as f64 / (max_y - min_y + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn filled_rect_mask(w: u32, h: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = rects
                .iter()
                .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
            if inside {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_square_patch_is_regular() {
        let mask = filled_rect_mask(200, 200, &[(50, 50, 40, 40)]);
        assert_eq!(CalibrationDetector::count_patches(&mask), (1, 1));
    }

    #[test]
    fn test_elongated_patch_is_not_regular() {
        let mask = filled_rect_mask(300, 200, &[(20, 50, 160, 30)]);
        assert_eq!(CalibrationDetector::count_patches(&mask), (1, 0));
    }

    #[test]
    fn test_tiny_patch_is_ignored() {
        let mask = filled_rect_mask(100, 100, &[(10, 10, 8, 8)]);
        assert_eq!(CalibrationDetector::count_patches(&mask), (0, 0));
    }

    #[test]
    fn test_polygon_area_and_aspect() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(polygon_area(&square), 100.0);
        assert_eq!(bounding_box_aspect(&square), 1.0);

        let wide = [
            Point::new(0, 0),
            Point::new(19, 0),
            Point::new(19, 9),
            Point::new(0, 9),
        ];
        assert_eq!(bounding_box_aspect(&wide), 2.0);
    }

    #[test]
    fn test_uniform_color_variety_is_zero() {
        let rgb = RgbImage::from_pixel(80, 80, Rgb([128, 64, 32]));
        assert_eq!(CalibrationDetector::color_variety(&rgb), 0.0);
    }

    #[test]
    fn test_checker_color_variety_saturates() {
        let rgb = RgbImage::from_fn(64, 64, |x, y| {
            if ((x / 8) + (y / 8)) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        assert_eq!(CalibrationDetector::color_variety(&rgb), 1.0);
    }

    #[test]
    fn test_small_image_has_no_variety() {
        let rgb = RgbImage::from_pixel(5, 5, Rgb([255, 0, 0]));
        assert_eq!(CalibrationDetector::color_variety(&rgb), 0.0);
    }

    #[test]
    fn test_decision_requires_all_three() {
        let result = CalibrationDetector::from_metrics(24, 20, 0.85);
        assert!(result.is_calibration);
        assert!((result.confidence - 0.9).abs() < 1e-6);

        assert!(!CalibrationDetector::from_metrics(9, 9, 0.9).is_calibration);
        assert!(!CalibrationDetector::from_metrics(12, 7, 0.9).is_calibration);
        assert!(!CalibrationDetector::from_metrics(12, 9, 0.7).is_calibration);
        assert_eq!(CalibrationDetector::from_metrics(12, 9, 0.7).confidence, 0.0);
    }

    #[test]
    fn test_plain_page_is_not_calibration() {
        let rgb = RgbImage::from_pixel(128, 128, Rgb([255, 255, 255]));
        let gray = image::DynamicImage::ImageRgb8(rgb.clone()).to_luma8();
        let result = CalibrationDetector::analyze(&rgb, &gray);
        assert!(!result.is_calibration);
        assert_eq!(result.rectangular_patches, 0);
    }
}
