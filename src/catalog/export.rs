//! Export naming
//!
//! Derived filenames for downstream rename/export tools.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use super::record::ImageRecord;
use super::store::ImageCatalog;
use super::types::Result;

/// Extension used when the original filename has none
const DEFAULT_EXPORT_EXTENSION: &str = "jpg";

/// Descriptive name: `"{basename} {type}[ p {number}]{.ext}"`
///
/// The number is bracketed when phantom and followed by the exception
/// suffix when one is set. The original extension is kept unchanged.
pub fn export_filename(record: &ImageRecord) -> String {
    let path = Path::new(&record.original_filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = format!("{} {}", stem, record.page_type);
    if let Some(number) = record.display_number() {
        name.push_str(" p ");
        name.push_str(&number);
    }
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    name
}

/// Final page name: `Page_{number padded to 3}.{ext}`, or `None` unless the
/// record is validated and numbered
pub fn rename_target(record: &ImageRecord) -> Option<String> {
    if !record.validated {
        return None;
    }
    let number = record.page_number.as_ref()?;
    let extension = Path::new(&record.original_filename)
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_EXPORT_EXTENSION.to_string());
    Some(format!("Page_{:0>3}.{}", number.to_string(), extension))
}

/// One planned rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEntry {
    pub id: Uuid,
    pub original_filename: String,
    pub source_path: Option<PathBuf>,
    pub target: String,
}

/// Rename targets for every validated, numbered record, in filename order
pub fn rename_plan(catalog: &ImageCatalog) -> Vec<RenameEntry> {
    catalog
        .sorted()
        .into_iter()
        .filter_map(|record| {
            rename_target(record).map(|target| RenameEntry {
                id: record.id,
                original_filename: record.original_filename.clone(),
                source_path: record.metadata.source_path.clone(),
                target,
            })
        })
        .collect()
}

/// Copy planned files into `output_dir` under their target names
///
/// Entries without a source path are skipped. A target used twice (an
/// exception page shares its base number) is written by the later entry.
pub fn copy_renamed(plan: &[RenameEntry], output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut seen = HashSet::new();
    let mut written = Vec::new();

    for entry in plan {
        let Some(source) = &entry.source_path else {
            warn!("{}: no source path, not copied", entry.original_filename);
            continue;
        };
        if !seen.insert(entry.target.as_str()) {
            warn!("{}: target {} already used", entry.original_filename, entry.target);
        }
        let destination = output_dir.join(&entry.target);
        std::fs::copy(source, &destination)?;
        written.push(destination);
    }

    info!("Copied {} pages to {}", written.len(), output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, PageType};
    use crate::numbering::PageNumber;
    use tempfile::tempdir;

    fn record(name: &str, page_type: PageType) -> ImageRecord {
        ImageRecord::new(name, Classification::new(page_type, 0.7))
    }

    #[test]
    fn test_export_filename_unnumbered() {
        let record = record("IMG_0001.jpg", PageType::Cover);
        assert_eq!(export_filename(&record), "IMG_0001 portada.jpg");
    }

    #[test]
    fn test_export_filename_numbered() {
        let mut record = record("IMG_0042.tif", PageType::Text);
        record.page_number = Some(PageNumber::Arabic(23));
        assert_eq!(export_filename(&record), "IMG_0042 texto p 23.tif");

        record.phantom_number = true;
        record.number_exception = Some("bis".into());
        assert_eq!(export_filename(&record), "IMG_0042 texto p [23] bis.tif");
    }

    #[test]
    fn test_export_filename_roman_and_dots() {
        let mut plate = record("scan.v2.png", PageType::Illustration);
        plate.page_number = Some(PageNumber::Roman("IX".into()));
        assert_eq!(export_filename(&plate), "scan.v2 ilustracion p IX.png");

        let bare = record("noext", PageType::Blank);
        assert_eq!(export_filename(&bare), "noext pagina_blanca");
    }

    #[test]
    fn test_rename_target_requires_validation_and_number() {
        let mut record = record("a.png", PageType::Text);
        assert_eq!(rename_target(&record), None);

        record.page_number = Some(PageNumber::Arabic(7));
        assert_eq!(rename_target(&record), None);

        record.validated = true;
        assert_eq!(rename_target(&record).as_deref(), Some("Page_007.png"));

        record.page_number = Some(PageNumber::Arabic(1234));
        assert_eq!(rename_target(&record).as_deref(), Some("Page_1234.png"));

        record.page_number = Some(PageNumber::Roman("IV".into()));
        assert_eq!(rename_target(&record).as_deref(), Some("Page_0IV.png"));
    }

    #[test]
    fn test_rename_target_default_extension() {
        let mut record = record("raw", PageType::Text);
        record.validated = true;
        record.page_number = Some(PageNumber::Arabic(2));
        assert_eq!(rename_target(&record).as_deref(), Some("Page_002.jpg"));
    }

    #[test]
    fn test_rename_plan_filters_and_orders() {
        let mut catalog = ImageCatalog::new();
        let mut b = record("b.jpg", PageType::Text);
        b.validated = true;
        b.page_number = Some(PageNumber::Arabic(2));
        let mut a = record("a.jpg", PageType::Text);
        a.validated = true;
        a.page_number = Some(PageNumber::Arabic(1));
        let mut c = record("c.jpg", PageType::Text);
        c.page_number = Some(PageNumber::Arabic(3));
        catalog.insert(b);
        catalog.insert(a);
        catalog.insert(c);

        let targets: Vec<String> = rename_plan(&catalog).into_iter().map(|e| e.target).collect();
        assert_eq!(targets, vec!["Page_001.jpg", "Page_002.jpg"]);
    }

    #[test]
    fn test_copy_renamed() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("scan.jpg");
        std::fs::write(&source, b"pixels").unwrap();

        let plan = vec![
            RenameEntry {
                id: Uuid::new_v4(),
                original_filename: "scan.jpg".into(),
                source_path: Some(source),
                target: "Page_001.jpg".into(),
            },
            RenameEntry {
                id: Uuid::new_v4(),
                original_filename: "upload.jpg".into(),
                source_path: None,
                target: "Page_002.jpg".into(),
            },
        ];

        let out = dir.path().join("renamed");
        let written = copy_renamed(&plan, &out).unwrap();

        assert_eq!(written, vec![out.join("Page_001.jpg")]);
        assert_eq!(std::fs::read(out.join("Page_001.jpg")).unwrap(), b"pixels");
    }
}
