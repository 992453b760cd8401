//! Headless place search host for stdin/stdout JSON communication.
//!
//! Reads `SearchRequest` messages as newline-delimited JSON from stdin and
//! writes one `SearchResult` per line to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use std::path::PathBuf;

use anyhow::Context;
use place_search::Pipeline;
use placefinder::{AppConfig, AppError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    placefinder::init_tracing();

    let Some(config_path) = parse_args()? else {
        print_usage();
        return Ok(());
    };

    let config = AppConfig::load(config_path.as_deref()).context("failed to load configuration")?;
    let search_config = config.to_search_config();
    let pipeline = Pipeline::from_config(&search_config).map_err(AppError::from)?;

    tracing::info!(
        providers = ?pipeline.provider_names(),
        generator = search_config.active_gemini().is_some(),
        "placefinder-host starting"
    );

    placefinder::bridge::run_stdio_bridge(&pipeline)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "placefinder-host exited with error");
            anyhow::anyhow!("placefinder-host failed: {e}")
        })?;

    tracing::info!("placefinder-host shut down cleanly");
    Ok(())
}

/// `Ok(None)` means help was requested.
fn parse_args() -> Result<Option<Option<PathBuf>>, AppError> {
    let mut args = std::env::args().skip(1);
    let mut config_path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().ok_or_else(|| {
                    AppError::Config("--config requires a file path".to_owned())
                })?;
                config_path = Some(PathBuf::from(path));
            }
            "help" | "--help" | "-h" => return Ok(None),
            other => {
                return Err(AppError::Config(format!(
                    "unknown argument `{other}` (use --config <path>)"
                )));
            }
        }
    }
    Ok(Some(config_path))
}

fn print_usage() {
    println!("usage: placefinder-host [--config <path>]");
    println!("  reads SearchRequest JSON lines on stdin, writes SearchResult JSON lines on stdout");
}
