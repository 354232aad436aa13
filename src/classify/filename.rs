//! Filename-based classification
//!
//! Scanning stations name captures after their role ("portada", "it8",
//! "_001"). Pattern groups are checked in a fixed order and the first hit
//! wins, so the order of [`ROLE_PATTERNS`] is part of the behavior: a name
//! such as "contraportada" is claimed by the cover group first.

use regex::Regex;
use tracing::trace;

use super::types::{Classification, PageType};

// ============================================================
// Constants
// ============================================================

/// Confidence of a role-pattern match
pub const ROLE_MATCH_CONFIDENCE: f32 = 0.9;

/// Confidence of a first-capture position match
pub const FIRST_POSITION_CONFIDENCE: f32 = 0.7;

/// Confidence of a second-capture position match
pub const SECOND_POSITION_CONFIDENCE: f32 = 0.6;

/// Confidence when nothing matches
pub const NO_MATCH_CONFIDENCE: f32 = 0.3;

/// Role pattern groups, evaluated in declaration order
pub const ROLE_PATTERNS: &[(PageType, &[&str])] = &[
    (PageType::Cover, &[r"00001", r"_001\b", r"cover", r"portada"]),
    (
        PageType::BackCover,
        &[r"final", r"back", r"contraportada", r"ultimo"],
    ),
    (PageType::Flyleaf, &[r"00002", r"_002\b", r"guard", r"guardia"]),
    (PageType::Insert, &[r"\bins\b", r"insert", r"inserto"]),
    (
        PageType::Reference,
        &[r"\bref\b", r"reference", r"target", r"it8", r"calibr"],
    ),
    (
        PageType::CalibrationTarget,
        &[r"target", r"it8", r"calibr", r"color.*chart"],
    ),
];

/// First-capture position pattern
const FIRST_POSITION_PATTERN: &str = r"00001|_001\b";

/// Second-capture position pattern
const SECOND_POSITION_PATTERN: &str = r"00002|_002\b";

// ============================================================
// Filename Matcher
// ============================================================

/// Classifies a page from its filename alone
#[derive(Debug, Clone)]
pub struct FilenameMatcher {
    groups: Vec<(PageType, Vec<Regex>)>,
    first_position: Regex,
    second_position: Regex,
}

impl Default for FilenameMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FilenameMatcher {
    /// Compile the built-in pattern table
    pub fn new() -> Self {
        let groups = ROLE_PATTERNS
            .iter()
            .map(|(page_type, patterns)| {
                let compiled = patterns.iter().map(|p| compile(p)).collect();
                (*page_type, compiled)
            })
            .collect();

        Self {
            groups,
            first_position: compile(FIRST_POSITION_PATTERN),
            second_position: compile(SECOND_POSITION_PATTERN),
        }
    }

    /// Classify a filename (matching is case-insensitive)
    pub fn classify(&self, filename: &str) -> Classification {
        let name = filename.to_lowercase();

        for (page_type, patterns) in &self.groups {
            if let Some(pattern) = patterns.iter().find(|re| re.is_match(&name)) {
                trace!("{} matched {} pattern {}", filename, page_type, pattern.as_str());
                return Classification::new(*page_type, ROLE_MATCH_CONFIDENCE);
            }
        }

        if self.first_position.is_match(&name) {
            return Classification::new(PageType::Cover, FIRST_POSITION_CONFIDENCE);
        }
        if self.second_position.is_match(&name) {
            return Classification::new(PageType::Flyleaf, SECOND_POSITION_CONFIDENCE);
        }

        Classification::new(PageType::Text, NO_MATCH_CONFIDENCE)
    }
}

/// Compile a pattern from the static tables
fn compile(pattern: &str) -> Regex {
    // Static patterns; covered by test_all_patterns_compile
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}
