use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use umya_spreadsheet::{new_file_empty_worksheet, writer};

use super::types::{CellValue, CombineError, ReportKind, Table};

/// Output location for a report written at `now`:
/// `<dir>/<stem>-<ISO-8601 timestamp with ':' and '.' replaced by '-'>.xlsx`
pub fn output_path(output_dir: &Path, kind: ReportKind, now: DateTime<Utc>) -> PathBuf {
    let stamp = now
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
        .replace([':', '.'], "-");

    output_dir.join(format!("{}-{}.xlsx", kind.file_stem(), stamp))
}

/// Write `table` as a single-sheet workbook: one header row of column labels,
/// then one row per table row. Absent values and blank strings leave their cell unset.
/// Returns the SHA-256 checksum of the written file.
#[instrument(level = "info", skip(table), fields(rows = table.len(), path = %output_path.display()))]
pub fn write_report(table: &Table, sheet_name: &str, output_path: &Path) -> Result<String, CombineError> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CombineError::write_error(output_path, format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let mut book = new_file_empty_worksheet();
    let sheet = book
        .new_sheet(sheet_name)
        .map_err(|e| CombineError::write_error(output_path, format!("Failed to add sheet '{}': {}", sheet_name, e)))?;

    for (col_idx, label) in table.columns().iter().enumerate() {
        let col_num = (col_idx + 1) as u32;
        sheet.get_cell_mut((col_num, 1)).set_value_string(label);
    }

    // Data starts on row 2, below the header
    for (row_idx, row) in table.rows().iter().enumerate() {
        let row_num = row_idx as u32 + 2;

        for (col_idx, cell) in row.values().iter().enumerate() {
            let col_num = (col_idx + 1) as u32;

            match cell {
                // umya-spreadsheet does not serialize empty-string cells, so an
                // explicit blank is written the same way as an absent value
                None | Some(CellValue::Empty) => {}
                Some(CellValue::Text(s)) if s.is_empty() => {}
                Some(CellValue::Text(s)) => {
                    sheet.get_cell_mut((col_num, row_num)).set_value_string(s);
                }
                Some(CellValue::Number(n)) => {
                    if !n.is_finite() {
                        return Err(CombineError::write_error(
                            output_path,
                            format!("Row {}, Col {}: cannot store {}", row_num, col_num, n),
                        ));
                    }
                    sheet.get_cell_mut((col_num, row_num)).set_value_number(*n);
                }
            }
        }
    }

    writer::xlsx::write(&book, output_path)
        .map_err(|e| CombineError::write_error(output_path, format!("Failed to write file: {}", e)))?;

    let checksum = compute_checksum(output_path)?;
    info!(checksum = %checksum, "report written");
    Ok(checksum)
}

/// Compute SHA-256 checksum of a file
pub fn compute_checksum(path: &Path) -> Result<String, CombineError> {
    let mut file = File::open(path)
        .map_err(|e| CombineError::write_error(path, format!("Failed to open file for checksum: {}", e)))?;

    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| CombineError::write_error(path, format!("Failed to read file for checksum: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
