//! Numbering module core types
//!
//! Page number values, book structure, validation problems and errors.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================
// Constants
// ============================================================

/// Roman numerals for preliminary pages 1..=20
pub const ROMAN_NUMERALS: [&str; 20] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI", "XVII", "XVIII", "XIX", "XX",
];

/// Known pagination exception suffixes
pub const EXCEPTION_SUFFIXES: [&str; 3] = ["bis", "ter", "quater"];

// ============================================================
// Error Types
// ============================================================

/// Numbering error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Image not found: {0}")]
    UnknownRecord(Uuid),

    #[error("Invalid page number: {0}")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, NumberingError>;

// ============================================================
// Page Numbers
// ============================================================

/// Numbering system of a page number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberType {
    #[default]
    Arabic,
    Roman,
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberType::Arabic => f.write_str("arabic"),
            NumberType::Roman => f.write_str("roman"),
        }
    }
}

impl FromStr for NumberType {
    type Err = NumberingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "arabic" => Ok(NumberType::Arabic),
            "roman" => Ok(NumberType::Roman),
            _ => Err(NumberingError::InvalidNumber(s.to_string())),
        }
    }
}

/// A printed page number
///
/// Serialized untagged: Arabic numbers as JSON integers, Roman numerals as
/// strings. Strings are read back through [`PageNumber::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageNumber {
    Arabic(u32),
    Roman(String),
}

impl PageNumber {
    /// Numeral for a 1-based position in the Roman table, or `None` past its end
    pub fn roman_at(position: u32) -> Option<Self> {
        let index = usize::try_from(position).ok()?.checked_sub(1)?;
        ROMAN_NUMERALS
            .get(index)
            .map(|numeral| PageNumber::Roman((*numeral).to_string()))
    }

    /// Numbering system this value belongs to
    pub fn number_type(&self) -> NumberType {
        match self {
            PageNumber::Arabic(_) => NumberType::Arabic,
            PageNumber::Roman(_) => NumberType::Roman,
        }
    }

    /// Integer value (Roman numerals are evaluated)
    pub fn value(&self) -> Option<u32> {
        match self {
            PageNumber::Arabic(n) => Some(*n),
            PageNumber::Roman(numeral) => parse_roman_numeral(numeral),
        }
    }

    /// Parse user input: digits are Arabic, a canonical numeral is Roman
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<u32>()
                .map(PageNumber::Arabic)
                .map_err(|_| NumberingError::InvalidNumber(text.to_string()));
        }

        // "IIII" or "VX" evaluate but are not how the number is written
        let numeral = trimmed.to_uppercase();
        match parse_roman_numeral(&numeral) {
            Some(value) if format_roman_numeral(value) == numeral => Ok(PageNumber::Roman(numeral)),
            _ => Err(NumberingError::InvalidNumber(text.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for PageNumber {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PageNumber::Arabic(n)),
            Raw::Text(text) => PageNumber::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageNumber::Arabic(n) => write!(f, "{}", n),
            PageNumber::Roman(numeral) => f.write_str(numeral),
        }
    }
}

impl From<u32> for PageNumber {
    fn from(n: u32) -> Self {
        PageNumber::Arabic(n)
    }
}

const ROMAN_MAP: [(&str, u32); 13] = [
    ("m", 1000),
    ("cm", 900),
    ("d", 500),
    ("cd", 400),
    ("c", 100),
    ("xc", 90),
    ("l", 50),
    ("xl", 40),
    ("x", 10),
    ("ix", 9),
    ("v", 5),
    ("iv", 4),
    ("i", 1),
];

/// Parse a Roman numeral to an integer
///
/// Lenient: any greedy decomposition is accepted ("IIII" is 4).
pub fn parse_roman_numeral(text: &str) -> Option<u32> {
    let text = text.trim().to_lowercase();

    let mut result = 0;
    let mut remaining = text.as_str();

    for (numeral, value) in &ROMAN_MAP {
        while remaining.starts_with(numeral) {
            result += value;
            remaining = &remaining[numeral.len()..];
        }
    }

    if remaining.is_empty() && result > 0 {
        Some(result)
    } else {
        None
    }
}

/// Canonical uppercase numeral for a value
pub fn format_roman_numeral(mut value: u32) -> String {
    let mut rendered = String::new();
    for (numeral, step) in &ROMAN_MAP {
        while value >= *step {
            rendered.push_str(&numeral.to_uppercase());
            value -= step;
        }
    }
    rendered
}

// ============================================================
// Analysis Results
// ============================================================

/// Front matter / main content boundary of a filename-ordered book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BookStructure {
    /// Index of the first numbered-type page
    pub main_start: Option<usize>,
    /// Flyleaves or title pages precede the main content
    pub has_preliminaries: bool,
    /// Last index of the preliminary range (when `has_preliminaries`)
    pub preliminary_end: Option<usize>,
    pub total_images: usize,
}

impl BookStructure {
    /// Whether an index falls inside the preliminary range
    pub fn is_preliminary(&self, index: usize) -> bool {
        self.has_preliminaries && self.preliminary_end.is_some_and(|end| index <= end)
    }
}

/// Counts from one auto-number pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NumberingSummary {
    pub structure: BookStructure,
    pub roman_assigned: usize,
    pub arabic_assigned: usize,
    pub unnumbered: usize,
}

/// Kind of numbering problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    SequenceBreak,
    RomanSequenceBreak,
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::SequenceBreak => f.write_str("sequence_break"),
            ProblemKind::RomanSequenceBreak => f.write_str("roman_sequence_break"),
        }
    }
}

/// A deviation from the expected numbering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceProblem {
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub image_id: Uuid,
    pub expected: String,
    pub found: String,
    pub message: String,
}

/// Exception suffix detected in a filename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionCandidate {
    pub image_id: Uuid,
    pub filename: String,
    pub detected_exception: String,
    pub confidence: f32,
}
