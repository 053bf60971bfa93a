//! Batch upload of a source tree into a remote collection.
//!
//! Flow: scan the ingest root → snapshot the collection ([`UploadTracker`])
//! → for each candidate, skip if its document name is already present,
//! otherwise convert to PDF and upload. Files are handled strictly one at a
//! time. A failure on one file is recorded in the [`IngestReport`] and the
//! loop moves on; there is no retry and no rollback.
//!
//! Re-running the pipeline against the same collection is safe: everything
//! uploaded by a previous run is skipped by name.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::client::AlbertClient;
use crate::collection::{upload_document, UploadTracker};
use crate::config::{Config, IngestConfig};
use crate::convert::{convert_file, document_name, PageLayout};
use crate::error::AlbertError;
use crate::progress::{IngestProgressEvent, IngestProgressReporter};

/// A candidate file found under the ingest root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative: PathBuf,
    /// Document name in the collection, see [`document_name`].
    pub name: String,
}

/// What happened to a single candidate file.
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded,
    /// Already present in the collection snapshot.
    Skipped,
    /// Dry run: would have been converted and uploaded.
    Planned,
    Failed(AlbertError),
}

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Override `ingest.root` from the config.
    pub root: Option<PathBuf>,
    pub dry_run: bool,
    /// Stop after this many conversion/upload attempts.
    pub limit: Option<usize>,
}

#[derive(Debug)]
pub struct IngestReport {
    pub collection_id: String,
    pub root: PathBuf,
    pub scanned: usize,
    pub outcomes: Vec<(SourceFile, UploadOutcome)>,
}

impl IngestReport {
    fn count(&self, pred: impl Fn(&UploadOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn uploaded(&self) -> usize {
        self.count(|o| matches!(o, UploadOutcome::Uploaded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, UploadOutcome::Skipped))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, UploadOutcome::Planned))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&SourceFile, &AlbertError)> {
        self.outcomes.iter().filter_map(|(file, o)| match o {
            UploadOutcome::Failed(err) => Some((file, err)),
            _ => None,
        })
    }

    /// Names uploaded during this run, in upload order.
    pub fn uploaded_names(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, UploadOutcome::Uploaded))
            .map(|(f, _)| f.name.as_str())
            .collect()
    }

    pub fn print_summary(&self) {
        println!("ingest {}", self.collection_id);
        println!("  root: {}", self.root.display());
        println!("  scanned: {} files", self.scanned);
        println!("  skipped (already uploaded): {}", self.skipped());
        if self.planned() > 0 {
            println!("  would upload: {}", self.planned());
            for (file, _) in self
                .outcomes
                .iter()
                .filter(|(_, o)| matches!(o, UploadOutcome::Planned))
            {
                println!("    {}", file.name);
            }
        }
        println!("  uploaded: {}", self.uploaded());
        let failures: Vec<_> = self.failures().collect();
        println!("  failed: {}", failures.len());
        for (file, err) in failures {
            println!("    {}: {}", file.relative.display(), err);
        }
        println!("ok");
    }
}

/// Run the ingest pipeline against `retrieval.collection_id`.
///
/// Errors returned here are preconditions (unreadable root, bad globs,
/// collection listing failure). Per-file problems are in the report.
pub async fn run_ingest(
    config: &Config,
    client: &AlbertClient,
    options: &IngestOptions,
    progress: &dyn IngestProgressReporter,
) -> Result<IngestReport> {
    let root = options
        .root
        .clone()
        .unwrap_or_else(|| config.ingest.root.clone());
    let collection_id = config.retrieval.collection_id.as_str();

    progress.report(IngestProgressEvent::Scanning {
        root: root.display().to_string(),
    });
    let files = scan_sources(&root, &config.ingest)?;
    info!(root = %root.display(), files = files.len(), "scan complete");

    let tracker = UploadTracker::fetch(client, collection_id).await?;
    let layout = PageLayout::a4(config.ingest.font_size);

    let total = files.len() as u64;
    let scanned = files.len();
    let mut attempts = 0usize;
    let mut outcomes = Vec::with_capacity(files.len());

    for (i, file) in files.into_iter().enumerate() {
        if tracker.should_skip(&file.name) {
            outcomes.push((file, UploadOutcome::Skipped));
        } else {
            if options.limit.is_some_and(|limit| attempts >= limit) {
                break;
            }
            attempts += 1;

            let outcome = if options.dry_run {
                UploadOutcome::Planned
            } else {
                ingest_one(client, collection_id, &file, &layout).await
            };
            outcomes.push((file, outcome));
        }
        progress.report(IngestProgressEvent::Uploading {
            n: i as u64 + 1,
            total,
        });
    }

    Ok(IngestReport {
        collection_id: collection_id.to_string(),
        root,
        scanned,
        outcomes,
    })
}

async fn ingest_one(
    client: &AlbertClient,
    collection_id: &str,
    file: &SourceFile,
    layout: &PageLayout,
) -> UploadOutcome {
    let result = match convert_file(&file.path, layout) {
        Ok(bytes) => upload_document(client, collection_id, &file.name, bytes).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            info!(name = %file.name, "uploaded");
            UploadOutcome::Uploaded
        }
        Err(err) => {
            warn!(path = %file.path.display(), error = %err, "upload failed");
            UploadOutcome::Failed(err)
        }
    }
}

/// Walk `root` recursively and return candidate files in path order.
pub fn scan_sources(root: &Path, ingest: &IngestConfig) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        bail!("Ingest root does not exist: {}", root.display());
    }

    let include_set = build_globset(&ingest.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/__pycache__/**".to_string(),
    ];
    default_excludes.extend(ingest.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(ingest.follow_symlinks)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                warn!(path = %path, error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy();

        if exclude_set.is_match(rel_str.as_ref()) || !include_set.is_match(rel_str.as_ref()) {
            continue;
        }

        files.push(SourceFile {
            path: path.to_path_buf(),
            relative: relative.to_path_buf(),
            name: document_name(relative),
        });
    }

    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
