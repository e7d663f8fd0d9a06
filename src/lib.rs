//! site_analyzer library: batch website analysis client
//!
//! This library submits batches of URLs to a website analysis service, follows
//! the resulting job until it completes, and exports the returned records as a
//! CSV table, a JSON document, and a paginated PDF report.
//!
//! # Example
//!
//! ```no_run
//! use site_analyzer::{run_analysis, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     file: std::path::PathBuf::from("urls.txt"),
//!     out_dir: std::path::PathBuf::from("./exports"),
//!     ..Default::default()
//! };
//!
//! let report = run_analysis(config).await?;
//! println!("Analyzed {} sites, {} artifact(s) written",
//!          report.total_sites, report.artifacts.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod api;
mod app;
pub mod config;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod metrics;
pub mod models;
pub mod poller;
pub mod report;
mod status_server;

// Re-export public API
pub use api::{AnalysisBackend, ApiClient};
pub use config::{Cli, Command, Config, ExportArgs, LogFormat, LogLevel, ServiceArgs};
pub use error_handling::{ApiError, ExportError, InitializationError, JobError};
pub use export::ExportFormat;
pub use models::{AnalysisOptions, AnalysisRequest, ResultRecord};
pub use poller::{JobPoller, PollerPhase, PollerSnapshot};
pub use report::{ReportAssembler, SnapshotProvider};
pub use run::{export_records, run_analysis, run_export, AnalysisReport};

// Internal run module (contains the end-to-end analysis flow)
mod run {
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Instant;

    use log::{info, warn};
    use tokio::io::AsyncReadExt;
    use tokio::sync::watch;
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;

    use crate::api::AnalysisBackend;
    use crate::app::{log_progress, log_statistics, shutdown_gracefully};
    use crate::config::{Config, ExportArgs, PROGRESS_LOG_INTERVAL};
    use crate::error_handling::ExportError;
    use crate::export::{from_document, write_flat, ExportFormat};
    use crate::initialization::init_client;
    use crate::models::{AnalysisRequest, ResultRecord};
    use crate::poller::{JobPoller, PollerSnapshot};
    use crate::report::{DirectorySnapshots, NoSnapshots, ReportAssembler, SnapshotProvider};
    use crate::status_server::{start_status_server, StatusState};

    /// Results of an analysis or export run.
    #[derive(Debug, Clone)]
    pub struct AnalysisReport {
        /// Identifier the service issued for the job (`None` for offline exports)
        pub job_id: Option<String>,
        /// Number of records exported
        pub total_sites: usize,
        /// Records carrying an `error` value
        pub failed_sites: usize,
        /// Files written, in the order the formats were requested
        pub artifacts: Vec<PathBuf>,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Submits the URLs listed in `config.file`, waits for the job, and writes
    /// the requested exports.
    ///
    /// Ctrl-C cancels the job; the run then fails with `JobError::Cancelled`
    /// and nothing is exported. A job that completes with no records is
    /// reported but writes no files.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The URL list cannot be read or contains no URLs
    /// - The HTTP client cannot be initialized
    /// - The job is rejected, fails, times out, or is cancelled
    /// - An export cannot be written
    pub async fn run_analysis(config: Config) -> Result<AnalysisReport> {
        let start_time = Instant::now();

        let text = read_url_input(&config.file)
            .await
            .with_context(|| format!("Failed to read URLs from {}", config.file.display()))?;
        let request = AnalysisRequest::from_lines(&text, config.analysis_options())
            .context("Invalid analysis request")?;

        let client = init_client(&config.service).context("Failed to initialize HTTP client")?;
        info!("Using analysis service at {}", client.base_url());

        let poller = Arc::new(
            JobPoller::new(Arc::new(client))
                .with_interval(config.poll_interval())
                .with_timeout(config.poll_timeout()),
        );

        let status_server = config.status_port.map(|port| {
            let state = StatusState::new(poller.subscribe());
            tokio::spawn(async move {
                if let Err(e) = start_status_server(port, state).await {
                    warn!("Status server stopped: {:#}", e);
                }
            })
        });

        let cancel = CancellationToken::new();
        let logging_task =
            spawn_progress_logger(poller.subscribe(), cancel.child_token(), start_time);
        let interrupt = spawn_interrupt_handler(Arc::clone(&poller), cancel.child_token());

        let outcome = poller.run(&request).await;

        shutdown_gracefully(cancel, Some(logging_task), status_server).await;
        let _ = interrupt.await;

        let records = outcome.context("Analysis job did not complete")?;
        let job_id = poller.snapshot().job_id.map(|id| id.to_string());
        info!("Job finished with {} record(s)", records.len());

        let artifacts = if records.is_empty() {
            warn!("The job returned no records; nothing to export");
            Vec::new()
        } else {
            log_statistics(&records);
            export_records(
                &records,
                &config.export_formats(),
                &config.out_dir,
                config.charts_dir.as_deref(),
            )
            .await?
        };

        Ok(AnalysisReport {
            job_id,
            total_sites: records.len(),
            failed_sites: count_failed(&records),
            artifacts,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Re-exports a `results.json` written by a previous run.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or decoded, holds no
    /// records, or an export cannot be written.
    pub async fn run_export(args: ExportArgs) -> Result<AnalysisReport> {
        let start_time = Instant::now();

        let text = tokio::fs::read_to_string(&args.input)
            .await
            .with_context(|| format!("Failed to read {}", args.input.display()))?;
        let records = from_document(&text)
            .with_context(|| format!("Failed to decode {}", args.input.display()))?;
        info!("Loaded {} record(s) from {}", records.len(), args.input.display());

        log_statistics(&records);
        let artifacts = export_records(
            &records,
            &args.export_formats(),
            &args.out_dir,
            args.charts_dir.as_deref(),
        )
        .await?;

        Ok(AnalysisReport {
            job_id: None,
            total_sites: records.len(),
            failed_sites: count_failed(&records),
            artifacts,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Writes `records` in each of `formats` into `out_dir`.
    ///
    /// The PDF report embeds chart snapshots from `charts_dir` when given;
    /// otherwise its sections carry tables only.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NoData` for an empty record set, or the first
    /// export that fails. Artifacts already written are kept.
    pub async fn export_records(
        records: &[ResultRecord],
        formats: &[ExportFormat],
        out_dir: &Path,
        charts_dir: Option<&Path>,
    ) -> Result<Vec<PathBuf>, ExportError> {
        if records.is_empty() {
            return Err(ExportError::NoData);
        }

        let mut artifacts = Vec::with_capacity(formats.len());
        for format in formats {
            let path = match format {
                ExportFormat::Pdf => {
                    let snapshots: Arc<dyn SnapshotProvider> = match charts_dir {
                        Some(dir) => Arc::new(DirectorySnapshots::new(dir)),
                        None => Arc::new(NoSnapshots),
                    };
                    ReportAssembler::new(snapshots)
                        .write_report(records, out_dir)
                        .await?
                }
                ExportFormat::Csv | ExportFormat::Json => write_flat(records, *format, out_dir)?,
            };
            artifacts.push(path);
        }
        Ok(artifacts)
    }

    async fn read_url_input(path: &Path) -> std::io::Result<String> {
        if path.as_os_str() == "-" {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        } else {
            tokio::fs::read_to_string(path).await
        }
    }

    fn count_failed(records: &[ResultRecord]) -> usize {
        records.iter().filter(|r| r.error().is_some()).count()
    }

    /// Logs progress whenever it changes, and at least every
    /// `PROGRESS_LOG_INTERVAL` while the job runs.
    fn spawn_progress_logger(
        mut updates: watch::Receiver<PollerSnapshot>,
        cancel: CancellationToken,
        start_time: Instant,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_LOG_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start_time, &updates.borrow());
                    }
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        log_progress(start_time, &snapshot);
                    }
                    _ = cancel.cancelled() => {
                        break;
                    }
                }
            }
        })
    }

    /// Cancels the job on Ctrl-C.
    fn spawn_interrupt_handler<B>(
        poller: Arc<JobPoller<B>>,
        cancel: CancellationToken,
    ) -> JoinHandle<()>
    where
        B: AnalysisBackend + 'static,
    {
        tokio::spawn(async move {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            warn!("Interrupted; cancelling the analysis job");
                            poller.cancel();
                        }
                        Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
                    }
                }
                _ = cancel.cancelled() => {}
            }
        })
    }

}
