use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::reader::{header_labels, read_first_sheet, SheetGrid};
use super::types::{CellValue, CombineError, Table};

/// Merge the first sheet of every file in `file_names` into one table.
///
/// The first file is the anchor: its header row, after `header_skip` title rows,
/// fixes the column labels (renamed through `aliases`). Every later file is
/// re-keyed by column position against those labels, whatever its own header says.
#[instrument(level = "info", skip_all, fields(dir = %base_dir.display(), files = file_names.len()))]
pub fn reconcile(
    file_names: &[String],
    base_dir: &Path,
    header_skip: usize,
    aliases: &[(&str, &str)],
) -> Result<Table, CombineError> {
    let mut files = file_names.iter();

    let Some(anchor_name) = files.next() else {
        debug!("no files to reconcile");
        return Ok(Table::default());
    };

    let anchor = read_first_sheet(&base_dir.join(anchor_name))?;
    let mut table = anchor_table(&anchor, header_skip, aliases);
    debug!(file = %anchor_name, rows = table.len(), columns = table.columns().len(), "anchor file read");

    for name in files {
        let grid = read_first_sheet(&base_dir.join(name))?;
        let appended = append_positional(&mut table, &grid, header_skip);
        debug!(file = %name, rows = appended, "file appended by position");
    }

    info!(rows = table.len(), columns = table.columns().len(), "reports reconciled");
    Ok(table)
}

/// Build the table from the anchor grid: header labels keyed by text, blank cells
/// defaulted to empty strings, wholly blank rows skipped.
pub fn anchor_table(grid: &SheetGrid, header_skip: usize, aliases: &[(&str, &str)]) -> Table {
    let Some(header) = grid.rows.get(header_skip) else {
        return Table::default();
    };

    let alias_map: HashMap<&str, &str> = aliases.iter().copied().collect();
    let columns = header_labels(header, grid.width)
        .into_iter()
        .map(|label| match alias_map.get(label.as_str()) {
            Some(alias) => (*alias).to_string(),
            None => label,
        })
        .collect::<Vec<_>>();

    let width = columns.len();
    let mut table = Table::new(columns);

    for row in grid.rows.iter().skip(header_skip + 1) {
        if row.iter().all(Option::is_none) {
            continue;
        }

        let values = (0..width)
            .map(|col| {
                Some(
                    row.get(col)
                        .cloned()
                        .flatten()
                        .unwrap_or_else(|| CellValue::text("")),
                )
            })
            .collect();
        table.push_row(values);
    }

    table
}

/// Append every row after the header row of `grid`, zipping cells to the
/// table's columns by index. Returns the number of rows appended.
pub fn append_positional(table: &mut Table, grid: &SheetGrid, header_skip: usize) -> usize {
    let mut appended = 0;

    for row in grid.rows.iter().skip(header_skip + 1) {
        table.push_row(row.clone());
        appended += 1;
    }

    appended
}
