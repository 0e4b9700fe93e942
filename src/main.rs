use clap::Parser;
use report_combiner::{run_combine, CombineRequest, CombineResponse, CombinerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Combine zipped stops and work-times exports into two reports", long_about = None)]
struct Cli {
    /// Zip archive of stops report exports
    #[arg(long, value_name = "ZIP")]
    stops: PathBuf,

    /// Zip archive of work-times report exports
    #[arg(long, value_name = "ZIP")]
    work_times: PathBuf,

    /// Directory the combined workbooks are written to (default: Downloads)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Directory scratch extractions are created under
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let response = match CombinerConfig::resolve(cli.output_dir, cli.data_dir) {
        Ok(config) => {
            info!(output = %config.output_dir.display(), scratch = %config.scratch_root.display(), "combining spreadsheets");
            let request = CombineRequest {
                stops_archive: cli.stops,
                work_times_archive: cli.work_times,
            };

            let result = run_combine(config, request).await;
            if let Ok(outcome) = &result {
                for written in &outcome.reports {
                    info!(report = %written.kind, rows = written.rows, checksum = %written.checksum, "wrote {}", written.path.display());
                }
            }
            CombineResponse::from(result)
        }
        Err(e) => CombineResponse::failed(e.to_string()),
    };

    if cli.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize response: {}", e),
        }
    } else if let Some(message) = response.message.as_deref().or(response.error.as_deref()) {
        println!("{}", message);
    }

    if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
