use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info, instrument};
use zip::ZipArchive;

use super::types::CombineError;

/// Extract the zip at `archive_path` into a freshly wiped `scratch_dir` and
/// return the names of the entries now sitting at its top level.
#[instrument(level = "info", skip_all, fields(archive = %archive_path.display(), scratch = %scratch_dir.display()))]
pub fn stage(archive_path: &Path, scratch_dir: &Path) -> Result<Vec<String>, CombineError> {
    clear_dir(scratch_dir)?;

    fs::create_dir_all(scratch_dir).map_err(|e| {
        CombineError::extraction(
            archive_path,
            format!("Failed to create {}: {}", scratch_dir.display(), e),
        )
    })?;

    let file = File::open(archive_path)
        .map_err(|e| CombineError::extraction(archive_path, format!("Failed to open archive: {}", e)))?;

    let mut archive = ZipArchive::new(file)
        .map_err(|e| CombineError::extraction(archive_path, format!("Not a readable zip archive: {}", e)))?;

    let entry_count = archive.len();
    archive
        .extract(scratch_dir)
        .map_err(|e| CombineError::extraction(archive_path, e.to_string()))?;

    let names = list_entries(scratch_dir).map_err(|e| {
        CombineError::extraction(
            archive_path,
            format!("Failed to list {}: {}", scratch_dir.display(), e),
        )
    })?;

    info!(entries = entry_count, files = names.len(), "archive staged");
    Ok(names)
}

/// Recursively delete `dir`; a directory that does not exist is already clear
pub fn clear_dir(dir: &Path) -> Result<(), CombineError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!(dir = %dir.display(), "scratch directory cleared");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CombineError::ScratchCleanupFailure {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Non-recursive listing of entry names, in filesystem enumeration order
pub fn list_entries(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
