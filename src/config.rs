use std::path::PathBuf;

use crate::report::CombineError;

/// Directory under the platform data directory that holds scratch space
pub const APP_DIR_NAME: &str = "report-combiner";

/// Overrides the directory combined reports are written to
pub const OUTPUT_DIR_ENV: &str = "REPORT_COMBINER_OUTPUT_DIR";

/// Overrides the directory scratch extractions are created under
pub const DATA_DIR_ENV: &str = "REPORT_COMBINER_DATA_DIR";

/// Where a run writes its reports and stages its archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinerConfig {
    pub output_dir: PathBuf,
    pub scratch_root: PathBuf,
}

impl CombinerConfig {
    pub fn new(output_dir: impl Into<PathBuf>, scratch_root: impl Into<PathBuf>) -> Self {
        CombinerConfig {
            output_dir: output_dir.into(),
            scratch_root: scratch_root.into(),
        }
    }

    /// Resolve directories from explicit overrides, then the environment,
    /// then the platform's downloads and data directories.
    pub fn resolve(
        output_override: Option<PathBuf>,
        data_override: Option<PathBuf>,
    ) -> Result<Self, CombineError> {
        let output_dir = match output_override.or_else(|| env_path(OUTPUT_DIR_ENV)) {
            Some(dir) => dir,
            None => default_output_dir()?,
        };

        let scratch_root = match data_override.or_else(|| env_path(DATA_DIR_ENV)) {
            Some(dir) => dir,
            None => default_scratch_root()?,
        };

        Ok(CombinerConfig {
            output_dir,
            scratch_root,
        })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn default_output_dir() -> Result<PathBuf, CombineError> {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or_else(|| CombineError::Config("Could not determine the downloads directory".to_string()))
}

fn default_scratch_root() -> Result<PathBuf, CombineError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| CombineError::Config("Could not determine the application data directory".to_string()))
}
