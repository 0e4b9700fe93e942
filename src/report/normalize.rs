use tracing::{debug, warn};

use super::types::{CellValue, ReportKind, Table, TimeEncoding, TimeField};

/// Written for idling values that are not numbers
pub const ZERO_DURATION: &str = "00:00:00";

/// Convert a fraction of a 24-hour day to `HH:MM:SS`. Hours are not capped at 23.
pub fn fraction_to_hms(fraction: f64) -> String {
    seconds_to_hms((fraction * 24.0 * 3600.0).round())
}

/// Convert a (possibly fractional) count of minutes to `HH:MM:SS`
pub fn minutes_to_hms(minutes: f64) -> String {
    seconds_to_hms((minutes * 60.0).round())
}

fn seconds_to_hms(total_seconds: f64) -> String {
    let sign = if total_seconds < 0.0 { "-" } else { "" };
    let total = total_seconds.abs() as u64;

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds)
}

impl TimeEncoding {
    pub fn to_hms(self, value: f64) -> String {
        match self {
            TimeEncoding::FractionOfDay => fraction_to_hms(value),
            TimeEncoding::Minutes => minutes_to_hms(value),
        }
    }
}

/// Apply the category's post-processing: drop its discarded columns, then
/// rewrite its time columns as `HH:MM:SS` text.
pub fn normalize_table(table: &mut Table, kind: ReportKind) {
    table.drop_columns(kind.dropped_columns());

    for field in kind.time_fields() {
        normalize_column(table, field);
    }
}

fn normalize_column(table: &mut Table, field: &TimeField) {
    let Some(col) = table.column_index(field.column) else {
        warn!(column = field.column, "time column not present, left as is");
        return;
    };

    let mut converted = 0usize;
    let mut zeroed = 0usize;

    for row in table.rows_mut() {
        let Some(slot) = row.slot_mut(col) else {
            continue;
        };

        match slot.as_ref().and_then(CellValue::as_number) {
            Some(value) => {
                *slot = Some(CellValue::Text(field.encoding.to_hms(value)));
                converted += 1;
            }
            None if field.zero_when_not_numeric => {
                *slot = Some(CellValue::text(ZERO_DURATION));
                zeroed += 1;
            }
            None => {}
        }
    }

    debug!(column = field.column, converted, zeroed, "time column normalized");
}
