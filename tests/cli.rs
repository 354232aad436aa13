//! Integration tests for the folio binary
//!
//! Each test builds its inputs in a temp dir and invokes the real CLI.

use assert_cmd::Command;
use folio::{
    exit_codes, Classification, ImageCatalog, ImageRecord, NumberingSequencer, PageNumber,
    PageType, RecordUpdate,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper to create a CLI command
fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_folio"))
}

fn write_white_png(path: &Path) {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 80, Rgb([255, 255, 255])))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Save a catalog of numbered text pages and return its path and ids
fn numbered_catalog(dir: &TempDir, count: usize) -> (std::path::PathBuf, Vec<Uuid>) {
    let mut catalog = ImageCatalog::new();
    let ids = (0..count)
        .map(|i| {
            catalog.insert(ImageRecord::new(
                format!("page_{:03}.jpg", i),
                Classification::new(PageType::Text, 0.7),
            ))
        })
        .collect();
    NumberingSequencer::auto_number(&mut catalog);

    let path = dir.path().join("book.json");
    catalog.save_json(&path).unwrap();
    (path, ids)
}

// ============ CLASSIFY COMMAND TESTS ============

#[test]
fn test_classify_help() {
    cli()
        .arg("classify")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-ocr"));
}

#[test]
fn test_classify_directory_saves_catalog() {
    let scans = TempDir::new().unwrap();
    write_white_png(&scans.path().join("0001_portada.png"));
    write_white_png(&scans.path().join("0002.png"));
    std::fs::write(scans.path().join("notes.txt"), "skip").unwrap();
    let out = TempDir::new().unwrap();
    let catalog_path = out.path().join("book.json");

    cli()
        .arg("-q")
        .arg("classify")
        .arg(scans.path())
        .arg("--catalog")
        .arg(&catalog_path)
        .arg("--no-ocr")
        .assert()
        .success()
        .stdout(predicate::str::contains("0001_portada.png"))
        .stdout(predicate::str::contains("portada"))
        .stdout(predicate::str::contains("2 images classified"));

    let catalog = ImageCatalog::load_json(&catalog_path).unwrap();
    assert_eq!(catalog.len(), 2);
    let types: Vec<PageType> = catalog.sorted().iter().map(|r| r.page_type).collect();
    assert_eq!(types, vec![PageType::Cover, PageType::Blank]);
}

#[test]
fn test_classify_json_output() {
    let scans = TempDir::new().unwrap();
    write_white_png(&scans.path().join("a.png"));

    let output = cli()
        .arg("-q")
        .arg("classify")
        .arg(scans.path())
        .arg("--no-ocr")
        .arg("--json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["records"][0]["type"], "pagina_blanca");
    assert_eq!(value["records"][0]["original_filename"], "a.png");
}

#[test]
fn test_classify_missing_input() {
    cli()
        .arg("classify")
        .arg("/nonexistent/scans")
        .arg("--no-ocr")
        .assert()
        .code(exit_codes::INPUT_NOT_FOUND)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_classify_empty_directory() {
    let scans = TempDir::new().unwrap();
    std::fs::write(scans.path().join("notes.txt"), "skip").unwrap();

    cli()
        .arg("classify")
        .arg(scans.path())
        .arg("--no-ocr")
        .assert()
        .code(exit_codes::INPUT_NOT_FOUND)
        .stderr(predicate::str::contains("No supported images"));
}

// ============ VALIDATE COMMAND TESTS ============

#[test]
fn test_validate_clean_catalog() {
    let dir = TempDir::new().unwrap();
    let (path, _) = numbered_catalog(&dir, 5);

    cli()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(exit_codes::SUCCESS)
        .stdout(predicate::str::contains("Numbering sequence OK"));
}

#[test]
fn test_validate_reports_break() {
    let dir = TempDir::new().unwrap();
    let (path, ids) = numbered_catalog(&dir, 5);
    let mut catalog = ImageCatalog::load_json(&path).unwrap();
    catalog
        .update(&ids[2], &RecordUpdate::new().page_number(PageNumber::Arabic(9)))
        .unwrap();
    catalog.save_json(&path).unwrap();

    cli()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(exit_codes::VALIDATION_FAILED)
        .stdout(predicate::str::contains("Expected page 3, found 9"))
        .stdout(predicate::str::contains("page_002.jpg"));
}

#[test]
fn test_validate_missing_catalog() {
    let dir = TempDir::new().unwrap();

    cli()
        .arg("validate")
        .arg(dir.path().join("absent.json"))
        .assert()
        .code(exit_codes::INPUT_NOT_FOUND);
}

// ============ EDIT COMMAND TESTS ============

#[test]
fn test_renumber_then_validate_json() {
    let dir = TempDir::new().unwrap();
    let (path, ids) = numbered_catalog(&dir, 4);

    cli()
        .arg("renumber")
        .arg(&path)
        .arg("--from")
        .arg(ids[2].to_string())
        .arg("--start")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Renumbered 2 pages"));

    let catalog = ImageCatalog::load_json(&path).unwrap();
    assert_eq!(
        catalog.get(&ids[3]).unwrap().page_number,
        Some(PageNumber::Arabic(11))
    );

    let output = cli().arg("validate").arg(&path).arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(exit_codes::VALIDATION_FAILED));
    let problems: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(problems.as_array().unwrap().len(), 2);
    assert_eq!(problems[0]["type"], "sequence_break");
}

#[test]
fn test_exception_keeps_sequence_valid() {
    let dir = TempDir::new().unwrap();
    let (path, ids) = numbered_catalog(&dir, 4);

    cli()
        .arg("exception")
        .arg(&path)
        .arg("--id")
        .arg(ids[2].to_string())
        .arg("--base")
        .arg("2")
        .assert()
        .success();

    cli().arg("validate").arg(&path).assert().success();

    let catalog = ImageCatalog::load_json(&path).unwrap();
    assert_eq!(
        catalog.get(&ids[2]).unwrap().display_number().as_deref(),
        Some("2 bis")
    );
}

#[test]
fn test_set_blank_exception_clears_tag() {
    let dir = TempDir::new().unwrap();
    let (path, ids) = numbered_catalog(&dir, 4);
    let mut catalog = ImageCatalog::load_json(&path).unwrap();
    NumberingSequencer::apply_exception(&mut catalog, ids[2], 2, "bis").unwrap();
    catalog.save_json(&path).unwrap();
    cli().arg("validate").arg(&path).assert().success();

    cli()
        .arg("set")
        .arg(&path)
        .arg("--id")
        .arg(ids[2].to_string())
        .arg("--exception")
        .arg("  ")
        .assert()
        .success();

    let catalog = ImageCatalog::load_json(&path).unwrap();
    assert_eq!(catalog.get(&ids[2]).unwrap().number_exception, None);

    // The duplicate 2 is no longer excused
    cli()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(exit_codes::VALIDATION_FAILED)
        .stdout(predicate::str::contains("Expected page 3, found 2"));
}

#[test]
fn test_set_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    let (path, _) = numbered_catalog(&dir, 2);

    cli()
        .arg("set")
        .arg(&path)
        .arg("--id")
        .arg(Uuid::new_v4().to_string())
        .arg("--validated")
        .arg("true")
        .assert()
        .code(exit_codes::GENERAL_ERROR)
        .stderr(predicate::str::contains("image not found"));
}

#[test]
fn test_export_names_copies_validated_pages() {
    let dir = TempDir::new().unwrap();
    let scans = TempDir::new().unwrap();
    write_white_png(&scans.path().join("scan_a.png"));
    let catalog_path = dir.path().join("book.json");

    cli()
        .arg("-q")
        .arg("classify")
        .arg(scans.path())
        .arg("--catalog")
        .arg(&catalog_path)
        .arg("--no-ocr")
        .assert()
        .success();

    let catalog = ImageCatalog::load_json(&catalog_path).unwrap();
    let id = catalog.sorted()[0].id;
    cli()
        .arg("set")
        .arg(&catalog_path)
        .arg("--id")
        .arg(id.to_string())
        .arg("--type")
        .arg("texto")
        .arg("--number")
        .arg("7")
        .arg("--validated")
        .arg("true")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 1 images"));

    let out = dir.path().join("renamed");
    cli()
        .arg("export-names")
        .arg(&catalog_path)
        .arg("--copy-to")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("scan_a texto p 7.png"))
        .stdout(predicate::str::contains("Page_007.png"));

    assert!(out.join("Page_007.png").is_file());
}

// ============ INFO COMMAND TESTS ============

#[test]
fn test_info() {
    cli()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("System Information:"))
        .stdout(predicate::str::contains("Tesseract"))
        .stdout(predicate::str::contains("folio.toml"));
}
