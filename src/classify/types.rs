//! Classification module core types
//!
//! Page roles, classification results and errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Confidence of the fallback result when an image cannot be decoded
pub const DECODE_FAILURE_CONFIDENCE: f32 = 0.1;

// ============================================================
// Error Types
// ============================================================

/// Classification error types
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Unknown page type name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown page type: {0}")]
pub struct ParsePageTypeError(pub String);

// ============================================================
// Page Types
// ============================================================

/// Structural role of a scanned page
///
/// Serialized with the catalog's Spanish role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    /// Front cover
    #[serde(rename = "portada")]
    Cover,
    /// Back cover
    #[serde(rename = "contraportada")]
    BackCover,
    /// Flyleaf / endpaper
    #[serde(rename = "guardia")]
    Flyleaf,
    /// Title or half-title page
    #[serde(rename = "frontispicio")]
    Frontispiece,
    /// Blank page
    #[serde(rename = "pagina_blanca")]
    Blank,
    /// Body text
    #[serde(rename = "texto")]
    Text,
    /// Illustration or plate
    #[serde(rename = "ilustracion")]
    Illustration,
    /// Color calibration target shot within the book
    #[serde(rename = "imagen_calibracion")]
    CalibrationTarget,
    /// Inserted leaf
    #[serde(rename = "inserto")]
    Insert,
    /// Reference shot (targets, rulers) outside the book sequence
    #[serde(rename = "referencia")]
    Reference,
}

impl PageType {
    /// Every page type, in catalog order
    pub const ALL: [PageType; 10] = [
        PageType::Cover,
        PageType::BackCover,
        PageType::Flyleaf,
        PageType::Frontispiece,
        PageType::Blank,
        PageType::Text,
        PageType::Illustration,
        PageType::CalibrationTarget,
        PageType::Insert,
        PageType::Reference,
    ];

    /// Catalog name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Cover => "portada",
            PageType::BackCover => "contraportada",
            PageType::Flyleaf => "guardia",
            PageType::Frontispiece => "frontispicio",
            PageType::Blank => "pagina_blanca",
            PageType::Text => "texto",
            PageType::Illustration => "ilustracion",
            PageType::CalibrationTarget => "imagen_calibracion",
            PageType::Insert => "inserto",
            PageType::Reference => "referencia",
        }
    }

    /// Whether pages of this type carry a page number
    pub fn is_numbered(&self) -> bool {
        matches!(
            self,
            PageType::Text | PageType::Illustration | PageType::CalibrationTarget | PageType::Insert
        )
    }

    /// Whether this type marks front matter ahead of the main content
    pub fn is_preliminary(&self) -> bool {
        matches!(self, PageType::Frontispiece | PageType::Flyleaf)
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = ParsePageTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PageType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ParsePageTypeError(s.to_string()))
    }
}

// ============================================================
// Classification Result
// ============================================================

/// Page role decision with its confidence (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub page_type: PageType,
    pub confidence: f32,
}

impl Classification {
    /// Create a classification, clamping confidence to [0, 1]
    pub fn new(page_type: PageType, confidence: f32) -> Self {
        Self {
            page_type,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Result used when the image cannot be decoded
    pub fn decode_fallback() -> Self {
        Self::new(PageType::Text, DECODE_FAILURE_CONFIDENCE)
    }
}
