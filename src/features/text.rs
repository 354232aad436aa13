//! Text presence detection
//!
//! Word and line statistics over OCR output. OCR failures degrade to "no text".

use image::DynamicImage;
use tracing::debug;

use super::ocr::OcrEngine;
use super::types::TextAnalysis;

/// More than this many words means the page has text
const MIN_WORDS_FOR_TEXT: usize = 3;

/// Word count that maps to full text confidence
const WORDS_FOR_FULL_CONFIDENCE: f32 = 10.0;

/// Line count range for a centered title
const TITLE_MIN_LINES: usize = 1;
const TITLE_MAX_LINES: usize = 3;

/// Character count range for a centered title
const TITLE_MIN_CHARS: usize = 10;
const TITLE_MAX_CHARS: usize = 100;

/// Text-presence test
pub struct TextDetector;

impl TextDetector {
    /// Run OCR on the image and analyze the recognized text
    pub fn detect(image: &DynamicImage, ocr: &dyn OcrEngine) -> TextAnalysis {
        match ocr.recognize(image) {
            Ok(text) => Self::analyze_text(&text),
            Err(e) => {
                debug!("OCR unavailable for text test: {}", e);
                TextAnalysis::default()
            }
        }
    }

    /// Analyze raw OCR output
    pub fn analyze_text(text: &str) -> TextAnalysis {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let word_count = text.split_whitespace().count();

        TextAnalysis {
            has_text: word_count > MIN_WORDS_FOR_TEXT,
            word_count,
            line_count: lines.len(),
            is_centered_title: Self::is_centered_title(&lines),
            confidence: (word_count as f32 / WORDS_FOR_FULL_CONFIDENCE).min(1.0),
        }
    }

    /// A handful of short lines is the shape of a title or half-title page
    fn is_centered_title(lines: &[&str]) -> bool {
        if !(TITLE_MIN_LINES..=TITLE_MAX_LINES).contains(&lines.len()) {
            return false;
        }
        let total_chars: usize = lines.iter().map(|line| line.chars().count()).sum();
        (TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&total_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ocr::{FixedTextOcr, NoOcr};

    #[test]
    fn test_body_text() {
        let text = "Era una mañana fría de invierno cuando el viajero llegó\n\
                    a la posada del camino real, cansado y hambriento.\n";
        let result = TextDetector::analyze_text(text);
        assert!(result.has_text);
        assert_eq!(result.line_count, 2);
        assert_eq!(result.word_count, 19);
        assert_eq!(result.confidence, 1.0);
        assert!(!result.is_centered_title);
    }

    #[test]
    fn test_centered_title() {
        let text = "\n\n   DON QUIJOTE   \n\n  DE LA MANCHA \n\n";
        let result = TextDetector::analyze_text(text);
        assert!(result.is_centered_title);
        assert_eq!(result.line_count, 2);
        assert_eq!(result.word_count, 5);
        assert!(result.has_text);
        assert!((result.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_short_title_below_char_range() {
        let result = TextDetector::analyze_text("FIN");
        assert!(!result.is_centered_title);
        assert!(!result.has_text);
    }

    #[test]
    fn test_too_many_lines_for_title() {
        let result = TextDetector::analyze_text("uno\ndos\ntres\ncuatro\n");
        assert!(!result.is_centered_title);
        assert_eq!(result.line_count, 4);
        assert!(result.has_text);
    }

    #[test]
    fn test_three_words_is_not_text() {
        let result = TextDetector::analyze_text("tres palabras solas");
        assert!(!result.has_text);
        assert_eq!(result.word_count, 3);
    }

    #[test]
    fn test_empty_text() {
        let result = TextDetector::analyze_text("");
        assert_eq!(result, TextAnalysis::default());
    }

    #[test]
    fn test_detect_with_failing_ocr() {
        let image = DynamicImage::new_rgb8(10, 10);
        let result = TextDetector::detect(&image, &NoOcr);
        assert!(!result.has_text);
        assert_eq!(result.word_count, 0);
    }

    #[test]
    fn test_detect_with_fixed_ocr() {
        let image = DynamicImage::new_rgb8(10, 10);
        let ocr = FixedTextOcr::new("uno dos tres cuatro cinco");
        let result = TextDetector::detect(&image, &ocr);
        assert!(result.has_text);
        assert_eq!(result.word_count, 5);
    }
}
