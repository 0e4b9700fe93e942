//! Combines zipped vehicle-telemetry spreadsheet exports into two
//! consolidated workbooks: a stops report and a work-times report.

pub mod commands;
pub mod config;
pub mod report;

pub use commands::{combine_spreadsheets, run_combine, CombineRequest, CombineResponse};
pub use config::CombinerConfig;
