use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::path::Path;
use tracing::{debug, instrument};

use super::types::{CellValue, CombineError};

/// Label given to a header cell that holds nothing at all
pub const MISSING_HEADER: &str = "__EMPTY";

/// One sheet row; `None` marks a cell that is not present in the sheet
pub type GridRow = Vec<Option<CellValue>>;

/// The first sheet of a workbook as a plain grid, anchored at cell A1
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    /// Number of columns from A to the right edge of the used range
    pub width: usize,
    /// Rows from sheet row 1 to the bottom of the used range, trailing absent cells trimmed
    pub rows: Vec<GridRow>,
}

impl SheetGrid {
    pub fn from_rows(rows: Vec<GridRow>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        SheetGrid { width, rows }
    }
}

/// Read the first sheet of the workbook at `path`
#[instrument(level = "debug", skip_all, fields(file = %path.display()))]
pub fn read_first_sheet(path: &Path) -> Result<SheetGrid, CombineError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| CombineError::read_error(path, format!("Failed to open workbook: {}", e)))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CombineError::read_error(path, "Workbook has no sheets"))?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| CombineError::read_error(path, format!("Failed to read sheet '{}': {}", first, e)))?;

    let grid = range_to_grid(&range);
    debug!(sheet = %first, rows = grid.rows.len(), width = grid.width, "sheet read");
    Ok(grid)
}

/// Lay the range out on absolute sheet coordinates so row and column
/// offsets do not depend on where the used range happens to start.
fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    let Some((end_row, end_col)) = range.end() else {
        return SheetGrid::default();
    };

    let mut rows = Vec::with_capacity(end_row as usize + 1);
    for row_idx in 0..=end_row {
        let mut row: GridRow = (0..=end_col)
            .map(|col_idx| range.get_value((row_idx, col_idx)).and_then(convert_cell_value))
            .collect();

        while matches!(row.last(), Some(None)) {
            row.pop();
        }
        rows.push(row);
    }

    SheetGrid {
        width: end_col as usize + 1,
        rows,
    }
}

/// Convert calamine Data to our CellValue
fn convert_cell_value(data: &Data) -> Option<CellValue> {
    let value = match data {
        Data::Empty => return None,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        // Exports store durations and times of day as day fractions
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    };
    Some(value)
}

/// Turn a header row into unique column labels, one per grid column.
///
/// Missing cells become [`MISSING_HEADER`]. A label that repeats an earlier one
/// gets `_1`, `_2`, ... appended, so three blank headers read `""`, `"_1"`, `"_2"`.
pub fn header_labels(header: &[Option<CellValue>], width: usize) -> Vec<String> {
    let mut labels: Vec<String> = Vec::with_capacity(width);

    for col in 0..width {
        let raw = match header.get(col) {
            Some(Some(cell)) => cell.display_text(),
            _ => MISSING_HEADER.to_string(),
        };
        let label = dedupe_label(&labels, &raw);
        labels.push(label);
    }

    labels
}

fn dedupe_label(existing: &[String], raw: &str) -> String {
    let mut label = raw.to_string();
    let mut counter = 0;

    while existing.contains(&label) {
        counter += 1;
        label = format!("{}_{}", raw, counter);
    }

    label
}
