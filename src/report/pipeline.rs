use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tracing::{info, instrument, warn};

use super::archive::stage;
use super::normalize::normalize_table;
use super::reconcile::reconcile;
use super::types::{CombineError, ReportKind};
use super::writer::{output_path, write_report};
use crate::config::CombinerConfig;

/// A report file produced by a run
#[derive(Debug, Clone, Serialize)]
pub struct WrittenReport {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub rows: usize,
    pub checksum: String,
}

/// Everything a successful run wrote, stops report first
#[derive(Debug, Clone, Serialize)]
pub struct CombineOutcome {
    pub reports: Vec<WrittenReport>,
}

/// Combine both archives into their two reports.
///
/// Both archives are staged into private scratch directories first; if either
/// fails to stage nothing is reconciled or written. Scratch directories are
/// removed when the run ends, whatever the outcome.
#[instrument(level = "info", skip_all, fields(stops = %stops_archive.display(), work_times = %work_times_archive.display()))]
pub fn run(
    config: &CombinerConfig,
    stops_archive: &Path,
    work_times_archive: &Path,
) -> Result<CombineOutcome, CombineError> {
    let stops_scratch = scratch_dir(&config.scratch_root, ReportKind::Stops)?;
    let work_times_scratch = scratch_dir(&config.scratch_root, ReportKind::WorkTimes)?;

    let staged_stops = stage(stops_archive, stops_scratch.path());
    let staged_work_times = stage(work_times_archive, work_times_scratch.path());

    let (stops_files, work_times_files) = match (staged_stops, staged_work_times) {
        (Ok(stops), Ok(work_times)) => (stops, work_times),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "staging failed, nothing combined");
            return Err(e);
        }
    };

    let reports = vec![
        combine_category(ReportKind::Stops, stops_files, stops_scratch.path(), &config.output_dir)?,
        combine_category(
            ReportKind::WorkTimes,
            work_times_files,
            work_times_scratch.path(),
            &config.output_dir,
        )?,
    ];

    Ok(CombineOutcome { reports })
}

/// Reconcile, normalize and write one category from its staged files
#[instrument(level = "info", skip(file_names, scratch, output_dir), fields(files = file_names.len()))]
pub fn combine_category(
    kind: ReportKind,
    mut file_names: Vec<String>,
    scratch: &Path,
    output_dir: &Path,
) -> Result<WrittenReport, CombineError> {
    // Directory listing order is platform dependent; sort so the anchor file is stable
    file_names.sort();

    let mut table = reconcile(&file_names, scratch, kind.header_skip(), kind.aliases())?;
    normalize_table(&mut table, kind);

    let path = output_path(output_dir, kind, Utc::now());
    let checksum = write_report(&table, kind.sheet_name(), &path)?;

    info!(report = %kind, path = %path.display(), rows = table.len(), "report combined");

    Ok(WrittenReport {
        kind,
        path,
        rows: table.len(),
        checksum,
    })
}

fn scratch_dir(root: &Path, kind: ReportKind) -> Result<TempDir, CombineError> {
    fs::create_dir_all(root).map_err(|source| CombineError::ScratchCleanupFailure {
        path: root.to_path_buf(),
        source,
    })?;

    Builder::new()
        .prefix(kind.scratch_prefix())
        .tempdir_in(root)
        .map_err(|source| CombineError::ScratchCleanupFailure {
            path: root.to_path_buf(),
            source,
        })
}
