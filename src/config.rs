//! Configuration file support
//!
//! Settings come from TOML, looked up in this order:
//!
//! 1. `./folio.toml`
//! 2. `<config dir>/folio/config.toml` (`~/.config/folio/config.toml` on Linux)
//! 3. Built-in defaults
//!
//! Command-line flags override file values through [`CliOverrides`].
//!
//! ```toml
//! [ocr]
//! enabled = true
//! language = "spa+eng"
//! tesseract_cmd = "tesseract"
//!
//! [ingest]
//! allowed_extensions = ["jpg", "jpeg", "png", "tiff", "tif"]
//! auto_number = true
//! threads = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{IngestOptions, DEFAULT_ALLOWED_EXTENSIONS};
use crate::classify::PageClassifier;
use crate::features::{OcrEngine, TesseractOcr, DEFAULT_OCR_LANGUAGE, DEFAULT_TESSERACT_CMD};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "folio.toml";

/// Environment variable overriding the tesseract command
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// OCR settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub enabled: bool,
    pub language: String,
    pub tesseract_cmd: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            tesseract_cmd: DEFAULT_TESSERACT_CMD.to_string(),
        }
    }
}

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub allowed_extensions: Vec<String>,
    pub auto_number: bool,
    pub threads: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            auto_number: true,
            threads: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub ingest: IngestConfig,
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ocr_enabled: Option<bool>,
    pub ocr_language: Option<String>,
    pub auto_number: Option<bool>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ocr_enabled(mut self, enabled: bool) -> Self {
        self.ocr_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_ocr_language(mut self, language: impl Into<String>) -> Self {
        self.ocr_language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_auto_number(mut self, enabled: bool) -> Self {
        self.auto_number = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

impl Config {
    /// Load from the first config file found, or defaults
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Candidate config files, highest priority first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(user) = Self::user_config_path() {
            paths.push(user);
        }
        paths
    }

    /// Per-user config file location
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("folio").join("config.toml"))
    }

    /// Apply command-line values on top of file values
    pub fn merge_with_cli(mut self, cli: &CliOverrides) -> Self {
        if let Some(enabled) = cli.ocr_enabled {
            self.ocr.enabled = enabled;
        }
        if let Some(language) = &cli.ocr_language {
            self.ocr.language = language.clone();
        }
        if let Some(auto_number) = cli.auto_number {
            self.ingest.auto_number = auto_number;
        }
        if let Some(threads) = cli.threads {
            self.ingest.threads = Some(threads);
        }
        self
    }

    /// Tesseract command, with the environment taking precedence
    pub fn tesseract_cmd(&self) -> String {
        std::env::var(TESSERACT_CMD_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.ocr.tesseract_cmd.clone())
    }

    /// Ingestion options for the batch ingestor
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions::builder()
            .allowed_extensions(&self.ingest.allowed_extensions)
            .auto_number(self.ingest.auto_number)
            .threads(self.ingest.threads.unwrap_or(0))
            .build()
    }

    /// Classifier wired to tesseract when OCR is enabled and installed
    pub fn classifier(&self) -> PageClassifier {
        if !self.ocr.enabled {
            return PageClassifier::without_ocr();
        }
        match TesseractOcr::locate(&self.tesseract_cmd(), &self.ocr.language) {
            Some(ocr) => {
                debug!("Using tesseract at {}", ocr.command().display());
                PageClassifier::new(Arc::new(ocr) as Arc<dyn OcrEngine>)
            }
            None => {
                warn!(
                    "OCR enabled but {} not found; text detection disabled",
                    self.tesseract_cmd()
                );
                PageClassifier::without_ocr()
            }
        }
    }
}
