use crate::config::CombinerConfig;
use crate::report::{self, CombineError, CombineOutcome};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

pub const SUCCESS_MESSAGE: &str = "Spreadsheets combined. Please check output directory";

/// A request to combine one stops archive and one work-times archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineRequest {
    pub stops_archive: PathBuf,
    pub work_times_archive: PathBuf,
}

/// The single reply sent back for a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CombineResponse {
    pub fn succeeded(message: impl Into<String>) -> Self {
        CombineResponse {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        CombineResponse {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<CombineError> for CommandError {
    fn from(e: CombineError) -> Self {
        let message = if e.is_staging_failure() {
            format!("Issue unzipping the files: {}", e)
        } else {
            e.to_string()
        };
        CommandError { message }
    }
}

impl From<Result<CombineOutcome, CommandError>> for CombineResponse {
    fn from(result: Result<CombineOutcome, CommandError>) -> Self {
        match result {
            Ok(_) => CombineResponse::succeeded(SUCCESS_MESSAGE),
            Err(e) => CombineResponse::failed(e.message),
        }
    }
}

/// Run the combine pipeline on the blocking pool
pub async fn run_combine(
    config: CombinerConfig,
    request: CombineRequest,
) -> Result<CombineOutcome, CommandError> {
    let outcome = tokio::task::spawn_blocking(move || {
        report::run(&config, &request.stops_archive, &request.work_times_archive)
    })
    .await
    .map_err(|e| CommandError { message: format!("Task join error: {}", e) })??;

    Ok(outcome)
}

/// Combine both archives and reply with exactly one aggregate outcome
pub async fn combine_spreadsheets(config: CombinerConfig, request: CombineRequest) -> CombineResponse {
    let result = run_combine(config, request).await;

    match &result {
        Ok(outcome) => {
            for written in &outcome.reports {
                info!(report = %written.kind, path = %written.path.display(), rows = written.rows, "combined report ready");
            }
        }
        Err(e) => error!(error = %e.message, "combine failed"),
    }

    CombineResponse::from(result)
}
