//! OCR engine seam
//!
//! Text recognition is an external facility. [`TesseractOcr`] shells out to
//! the `tesseract` executable; [`NoOcr`] stands in when it is not installed.
//! Calls block until the engine returns and carry no timeout of their own.

use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use super::types::{OcrError, OcrResult};

/// Default Tesseract language set (Spanish + English)
pub const DEFAULT_OCR_LANGUAGE: &str = "spa+eng";

/// Default Tesseract executable name
pub const DEFAULT_TESSERACT_CMD: &str = "tesseract";

/// Text recognition engine
pub trait OcrEngine: Send + Sync {
    /// Extract raw text from an image
    fn recognize(&self, image: &DynamicImage) -> OcrResult<String>;
}

/// Engine used when OCR is disabled or not installed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn recognize(&self, _image: &DynamicImage) -> OcrResult<String> {
        Err(OcrError::Unavailable)
    }
}

/// Tesseract command-line engine
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: PathBuf,
    language: String,
}

impl TesseractOcr {
    /// Create an engine for an explicit executable
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    /// Resolve the executable on PATH, returning `None` if it is missing
    pub fn locate(command: &str, language: &str) -> Option<Self> {
        match which::which(command) {
            Ok(path) => Some(Self::new(path, language)),
            Err(e) => {
                debug!("Tesseract not found ({}): {}", command, e);
                None
            }
        }
    }

    /// Executable path
    pub fn command(&self) -> &Path {
        &self.command
    }

    /// Language set passed with `-l`
    pub fn language(&self) -> &str {
        &self.language
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> OcrResult<String> {
        let input = tempfile::Builder::new()
            .prefix("folio-ocr-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Failed(e.to_string()))?;

        let output = Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Failed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Engine returning canned text, for tests
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FixedTextOcr {
    text: String,
}

#[cfg(test)]
impl FixedTextOcr {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
impl OcrEngine for FixedTextOcr {
    fn recognize(&self, _image: &DynamicImage) -> OcrResult<String> {
        Ok(self.text.clone())
    }
}
