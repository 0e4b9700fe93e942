use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single cell value as it flows through the combiner
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Numeric reading of the cell, following spreadsheet-script coercion:
    /// blank text counts as zero, other text must parse as a decimal number.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Empty => 0.0,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
                    // rejects "inf"/"nan" spellings that f64::from_str accepts
                    return None;
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
        };

        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Text used when the cell serves as a header label
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One table row: a slot per table column, `None` meaning the value is absent
/// (as opposed to an explicit empty cell).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Option<CellValue>>,
}

impl Row {
    pub fn values(&self) -> &[Option<CellValue>] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Option<CellValue>> {
        self.values.get_mut(index)
    }
}

/// An ordered set of rows sharing one column-label sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Value of `label` in row `row`, `None` when the column is unknown or the value absent
    pub fn value(&self, row: usize, label: &str) -> Option<&CellValue> {
        let col = self.column_index(label)?;
        self.rows.get(row)?.get(col)
    }

    /// Append a row, zipping `values` against the columns by position.
    /// Missing positions stay absent and surplus positions are discarded.
    pub fn push_row(&mut self, mut values: Vec<Option<CellValue>>) {
        values.resize(self.columns.len(), None);
        self.rows.push(Row { values });
    }

    /// Remove every column whose label is in `labels`, from the header and from each row
    pub fn drop_columns(&mut self, labels: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !labels.contains(&c.as_str()))
            .collect();

        if keep.iter().all(|k| *k) {
            return;
        }

        self.columns = retain_masked(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            row.values = retain_masked(std::mem::take(&mut row.values), &keep);
        }
    }
}

fn retain_masked<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

/// How a numeric time column is encoded in the source exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeEncoding {
    /// Fraction of a 24-hour day
    FractionOfDay,
    /// Count of minutes, possibly fractional
    Minutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeField {
    pub column: &'static str,
    pub encoding: TimeEncoding,
    /// Write `00:00:00` for values that are not numbers instead of leaving them untouched
    pub zero_when_not_numeric: bool,
}

/// The two categories of telemetry export the combiner understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Stops,
    WorkTimes,
}

const WORK_TIMES_ALIASES: &[(&str, &str)] = &[
    ("", "Date"),
    ("_1", "Licence plate"),
    ("_2", "Vehicle"),
    ("_3", "Vehicle Title"),
    ("_4", "Total Driving Time"),
];

const WORK_TIMES_DROPPED: &[&str] = &["Driving time_1", "Total Driving Time", "_5", "Distance_1"];

const STOPS_TIME_FIELDS: &[TimeField] = &[
    TimeField {
        column: "Parking time",
        encoding: TimeEncoding::FractionOfDay,
        zero_when_not_numeric: false,
    },
    TimeField {
        column: "Ignition on",
        encoding: TimeEncoding::FractionOfDay,
        zero_when_not_numeric: false,
    },
    TimeField {
        column: "Engine on",
        encoding: TimeEncoding::FractionOfDay,
        zero_when_not_numeric: false,
    },
];

const WORK_TIMES_TIME_FIELDS: &[TimeField] = &[TimeField {
    column: "Excessive idling",
    encoding: TimeEncoding::Minutes,
    zero_when_not_numeric: true,
}];

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Stops, ReportKind::WorkTimes];

    /// Stem of the output file name
    pub fn file_stem(self) -> &'static str {
        match self {
            ReportKind::Stops => "combinedStopsReport",
            ReportKind::WorkTimes => "combinedWorkTimesReport",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            ReportKind::Stops => "Combined Stops Report",
            ReportKind::WorkTimes => "Combined Work Times Report",
        }
    }

    pub fn scratch_prefix(self) -> &'static str {
        match self {
            ReportKind::Stops => "stopsReport-",
            ReportKind::WorkTimes => "workTimesReport-",
        }
    }

    /// Decorative title rows above the header row
    pub fn header_skip(self) -> usize {
        match self {
            ReportKind::Stops => 5,
            ReportKind::WorkTimes => 4,
        }
    }

    pub fn aliases(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ReportKind::Stops => &[],
            ReportKind::WorkTimes => WORK_TIMES_ALIASES,
        }
    }

    pub fn dropped_columns(self) -> &'static [&'static str] {
        match self {
            ReportKind::Stops => &[],
            ReportKind::WorkTimes => WORK_TIMES_DROPPED,
        }
    }

    pub fn time_fields(self) -> &'static [TimeField] {
        match self {
            ReportKind::Stops => STOPS_TIME_FIELDS,
            ReportKind::WorkTimes => WORK_TIMES_TIME_FIELDS,
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Stops => write!(f, "stops"),
            ReportKind::WorkTimes => write!(f, "work times"),
        }
    }
}

/// Errors raised while combining reports
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("Failed to extract archive {}: {message}", .path.display())]
    ExtractionFailure { path: PathBuf, message: String },

    #[error("Failed to clear scratch directory {}: {source}", .path.display())]
    ScratchCleanupFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read spreadsheet {}: {message}", .path.display())]
    SpreadsheetReadFailure { path: PathBuf, message: String },

    #[error("Failed to write report {}: {message}", .path.display())]
    WriteFailure { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CombineError {
    pub fn extraction(path: &Path, message: impl Into<String>) -> Self {
        CombineError::ExtractionFailure {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn read_error(path: &Path, message: impl Into<String>) -> Self {
        CombineError::SpreadsheetReadFailure {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn write_error(path: &Path, message: impl Into<String>) -> Self {
        CombineError::WriteFailure {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// True for failures that happen before any spreadsheet is read
    pub fn is_staging_failure(&self) -> bool {
        matches!(
            self,
            CombineError::ExtractionFailure { .. } | CombineError::ScratchCleanupFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_ab() -> Table {
        let mut table = Table::new(vec!["A".to_string(), "B".to_string()]);
        table.push_row(vec![Some(CellValue::Number(1.0)), Some(CellValue::Number(2.0))]);
        table
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut table = table_ab();
        table.push_row(vec![Some(CellValue::text("x"))]);
        table.push_row(vec![
            Some(CellValue::text("p")),
            Some(CellValue::text("q")),
            Some(CellValue::text("dropped")),
        ]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[1].values(), &[Some(CellValue::text("x")), None]);
        assert_eq!(table.value(2, "B"), Some(&CellValue::text("q")));
        assert!(table.rows().iter().all(|r| r.values().len() == 2));
    }

    #[test]
    fn test_drop_columns() {
        let mut table = Table::new(vec!["A".into(), "Total Driving Time".into(), "C".into()]);
        table.push_row(vec![
            Some(CellValue::Number(1.0)),
            Some(CellValue::Number(2.0)),
            Some(CellValue::Number(3.0)),
        ]);

        table.drop_columns(&["Total Driving Time", "Not There"]);

        assert_eq!(table.columns(), &["A".to_string(), "C".to_string()]);
        assert_eq!(
            table.rows()[0].values(),
            &[Some(CellValue::Number(1.0)), Some(CellValue::Number(3.0))]
        );
    }

    #[test]
    fn test_as_number_coercion() {
        assert_eq!(CellValue::Number(1.5).as_number(), Some(1.5));
        assert_eq!(CellValue::text("").as_number(), Some(0.0));
        assert_eq!(CellValue::text("  2.25 ").as_number(), Some(2.25));
        assert_eq!(CellValue::text("1e2").as_number(), Some(100.0));
        assert_eq!(CellValue::text("n/a").as_number(), None);
        assert_eq!(CellValue::text("inf").as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CellValue::Number(3.0).display_text(), "3");
        assert_eq!(CellValue::Number(2.5).display_text(), "2.5");
        assert_eq!(CellValue::Empty.display_text(), "");
    }

    #[test]
    fn test_staging_failure_classification() {
        let err = CombineError::extraction(Path::new("a.zip"), "bad");
        assert!(err.is_staging_failure());
        let err = CombineError::read_error(Path::new("a.xlsx"), "bad");
        assert!(!err.is_staging_failure());
    }
}
