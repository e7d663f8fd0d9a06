//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `site_analyzer` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use site_analyzer::initialization::{init_client, init_logger_with};
use site_analyzer::{run_analysis, run_export, AnalysisReport, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting SITE_ANALYZER_API_URL in .env without exporting it manually
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    match dispatch(cli.command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("site_analyzer error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Analyze(config) => {
            let report = run_analysis(config).await?;
            print_summary(&report);
        }
        Command::Export(args) => {
            let report = run_export(args).await?;
            print_summary(&report);
        }
        Command::History { service, limit } => {
            let client = init_client(&service).context("Failed to initialize HTTP client")?;
            let records = client
                .history(limit)
                .await
                .context("Failed to fetch history")?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::ClearHistory { service } => {
            let client = init_client(&service).context("Failed to initialize HTTP client")?;
            let message = client
                .clear_history()
                .await
                .context("Failed to clear history")?;
            println!("{}", message);
        }
        Command::Health { service } => {
            let client = init_client(&service).context("Failed to initialize HTTP client")?;
            let status = client
                .health()
                .await
                .with_context(|| format!("Service at {} is unreachable", client.base_url()))?;
            println!("{} is {}", client.base_url(), status);
        }
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let job = report
        .job_id
        .as_deref()
        .map(|id| format!(" (job {id})"))
        .unwrap_or_default();
    println!(
        "✅ Analyzed {} site{}{} ({} with errors) in {:.1}s",
        report.total_sites,
        if report.total_sites == 1 { "" } else { "s" },
        job,
        report.failed_sites,
        report.elapsed_seconds
    );
    for path in &report.artifacts {
        println!("Saved {}", path.display());
    }
}
