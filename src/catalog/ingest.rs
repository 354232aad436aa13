//! Batch ingestion
//!
//! Files are read and classified in parallel outside the catalog lock. The
//! new records are then inserted, and the collection auto-numbered, under a
//! single write guard. One bad file never aborts the batch.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::record::ImageRecord;
use super::store::SharedCatalog;
use super::types::{CatalogError, ImageMetadata, IngestFailure, IngestOptions, IngestReport, Result};
use crate::classify::PageClassifier;
use crate::numbering::NumberingSequencer;

/// Per-file progress notifications
pub trait IngestProgress: Sync {
    /// Called once before classification starts
    fn on_start(&self, _total: usize) {}

    /// Called after each file, successful or not
    fn on_file_done(&self, path: &Path);

    /// Called once after the batch is stored
    fn on_finish(&self) {}
}

/// Progress sink that reports nothing
pub struct SilentProgress;

impl IngestProgress for SilentProgress {
    fn on_file_done(&self, _path: &Path) {}
}

/// A classified image ready for insertion
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub record: ImageRecord,
    /// Classification fell back because the image could not be decoded
    pub decode_fallback: bool,
}

/// Reads, fingerprints and classifies image files into a catalog
#[derive(Clone)]
pub struct Ingestor {
    classifier: PageClassifier,
    options: IngestOptions,
}

impl Ingestor {
    pub fn new(classifier: PageClassifier, options: IngestOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Whether a path passes the extension filter
    pub fn is_allowed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.options.allows_extension(e))
    }

    /// List the files to ingest from a file or a directory (non-recursive)
    ///
    /// Returns accepted files in filename order and the rejected ones.
    pub fn collect_inputs(&self, input: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        if !input.exists() {
            return Err(CatalogError::InputNotFound(input.to_path_buf()));
        }

        let mut candidates = if input.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() {
                    files.push(path);
                }
            }
            files
        } else {
            vec![input.to_path_buf()]
        };
        candidates.sort();

        let (accepted, skipped): (Vec<PathBuf>, Vec<PathBuf>) =
            candidates.into_iter().partition(|p| self.is_allowed(p));

        for path in &skipped {
            debug!("Skipping {}: extension not allowed", path.display());
        }

        Ok((accepted, skipped))
    }

    /// Classify in-memory image bytes into a new record
    ///
    /// Undecodable bytes still produce a record, classified as the fallback.
    pub fn prepare_bytes(&self, filename: &str, bytes: &[u8]) -> PreparedImage {
        let mut metadata = ImageMetadata {
            size_bytes: bytes.len() as u64,
            sha256: format!("{:x}", Sha256::digest(bytes)),
            format: image::guess_format(bytes)
                .ok()
                .map(|f| format!("{:?}", f).to_lowercase()),
            ..Default::default()
        };

        let decoded = PageClassifier::decode(bytes);
        let decode_fallback = decoded.is_err();
        let result = decoded.map(|image| {
            metadata.width = image.width();
            metadata.height = image.height();
            self.classifier.classify_image(&image, filename)
        });
        let classification = PageClassifier::or_fallback(result, filename);

        debug!(
            "{} -> {} ({:.2})",
            filename, classification.page_type, classification.confidence
        );

        PreparedImage {
            record: ImageRecord::new(filename, classification).with_metadata(metadata),
            decode_fallback,
        }
    }

    /// Read and classify one file
    pub fn prepare_path(&self, path: &Path) -> std::result::Result<PreparedImage, IngestFailure> {
        let bytes = std::fs::read(path).map_err(|e| {
            warn!("{}: unreadable: {}", path.display(), e);
            IngestFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut prepared = self.prepare_bytes(&filename, &bytes);
        prepared.record.metadata.source_path = Some(path.to_path_buf());
        Ok(prepared)
    }

    /// Ingest every allowed file under `input`
    pub fn ingest(
        &self,
        catalog: &SharedCatalog,
        input: &Path,
        progress: &dyn IngestProgress,
    ) -> Result<IngestReport> {
        let (accepted, skipped) = self.collect_inputs(input)?;
        let mut report = self.ingest_paths(catalog, &accepted, progress)?;
        report.skipped = skipped;
        Ok(report)
    }

    /// Ingest the given files
    pub fn ingest_paths(
        &self,
        catalog: &SharedCatalog,
        paths: &[PathBuf],
        progress: &dyn IngestProgress,
    ) -> Result<IngestReport> {
        progress.on_start(paths.len());

        let results = self.run_parallel(|| {
            paths
                .par_iter()
                .map(|path| {
                    let result = self.prepare_path(path);
                    progress.on_file_done(path);
                    result
                })
                .collect::<Vec<_>>()
        });

        let mut report = IngestReport::default();
        let mut prepared = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(image) => prepared.push(image),
                Err(failure) => report.failures.push(failure),
            }
        }

        {
            let mut guard = catalog.write()?;
            for image in prepared {
                if image.decode_fallback {
                    report.decode_fallbacks += 1;
                }
                let id: Uuid = guard.insert(image.record);
                report.ingested.push(id);
            }
            if self.options.auto_number {
                report.numbering = Some(NumberingSequencer::auto_number(&mut guard));
            }
        }

        progress.on_finish();
        info!(
            "Ingested {} images ({} decode fallbacks, {} failures)",
            report.ingested.len(),
            report.decode_fallbacks,
            report.failures.len()
        );

        Ok(report)
    }

    /// Run on a dedicated pool when a thread count is configured
    fn run_parallel<T, F>(&self, work: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        let Some(threads) = self.options.threads else {
            return work();
        };
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(work),
            Err(e) => {
                warn!("Cannot build {}-thread pool, using default: {}", threads, e);
                work()
            }
        }
    }
}
