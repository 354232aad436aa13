//! Book structure analysis
//!
//! Finds where the main content begins in a filename-ordered sequence and
//! whether flyleaves or title pages come before it.

use tracing::debug;

use super::types::BookStructure;
use crate::classify::PageType;

/// Locates the front matter / main content boundary
pub struct PageStructureAnalyzer;

impl PageStructureAnalyzer {
    /// Analyze page types given in filename order
    pub fn analyze(page_types: &[PageType]) -> BookStructure {
        let main_start = page_types.iter().position(|t| t.is_numbered());

        let preliminary_count = main_start
            .map(|start| {
                page_types[..start]
                    .iter()
                    .filter(|t| t.is_preliminary())
                    .count()
            })
            .unwrap_or(0);

        let has_preliminaries = preliminary_count > 0;
        let preliminary_end = match main_start {
            Some(start) if has_preliminaries => start.checked_sub(1),
            _ => None,
        };

        let structure = BookStructure {
            main_start,
            has_preliminaries,
            preliminary_end,
            total_images: page_types.len(),
        };

        debug!(
            "Book structure: main_start={:?}, preliminaries={} (end {:?}), total={}",
            structure.main_start,
            structure.has_preliminaries,
            structure.preliminary_end,
            structure.total_images
        );

        structure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageType::*;

    #[test]
    fn test_empty_sequence() {
        let structure = PageStructureAnalyzer::analyze(&[]);
        assert_eq!(structure, BookStructure::default());
    }

    #[test]
    fn test_frontispiece_before_text() {
        let structure = PageStructureAnalyzer::analyze(&[Frontispiece, Text, Illustration, Text]);
        assert_eq!(structure.main_start, Some(1));
        assert!(structure.has_preliminaries);
        assert_eq!(structure.preliminary_end, Some(0));
        assert_eq!(structure.total_images, 4);
    }

    #[test]
    fn test_cover_only_front_matter() {
        // A cover alone does not make preliminaries
        let structure = PageStructureAnalyzer::analyze(&[Cover, Blank, Text]);
        assert_eq!(structure.main_start, Some(2));
        assert!(!structure.has_preliminaries);
        assert_eq!(structure.preliminary_end, None);
    }

    #[test]
    fn test_no_numbered_pages() {
        let structure = PageStructureAnalyzer::analyze(&[Cover, Flyleaf, BackCover]);
        assert_eq!(structure.main_start, None);
        assert!(!structure.has_preliminaries);
    }

    #[test]
    fn test_numbered_first() {
        let structure = PageStructureAnalyzer::analyze(&[Insert, Flyleaf, Text]);
        assert_eq!(structure.main_start, Some(0));
        assert!(!structure.has_preliminaries);
    }

    #[test]
    fn test_flyleaves_counted() {
        let structure = PageStructureAnalyzer::analyze(&[Cover, Flyleaf, Flyleaf, Frontispiece, Text]);
        assert_eq!(structure.main_start, Some(4));
        assert_eq!(structure.preliminary_end, Some(3));
        assert!(structure.is_preliminary(3));
        assert!(!structure.is_preliminary(4));
    }
}
