//! Report module for combining zipped telemetry spreadsheet exports.
//!
//! This module provides:
//! - Staging zip archives into scratch directories
//! - Reading the first sheet of each export
//! - Merging exports into one table, keyed by the first file's header
//! - Normalizing time columns to `HH:MM:SS`
//! - Writing the combined table as a single-sheet workbook

pub mod types;
pub mod archive;
pub mod reader;
pub mod reconcile;
pub mod normalize;
pub mod writer;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types and functions
pub use types::*;
pub use archive::stage;
pub use reconcile::reconcile;
pub use normalize::{fraction_to_hms, minutes_to_hms, normalize_table};
pub use writer::{output_path, write_report, compute_checksum};
pub use pipeline::{run, combine_category, CombineOutcome, WrittenReport};
