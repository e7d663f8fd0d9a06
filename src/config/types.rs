//! Configuration types and CLI options.
//!
//! This module defines the command-line surface (`Cli` and its subcommands) and
//! the library configuration structs those subcommands carry.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    API_URL_ENV, DEFAULT_API_URL, DEFAULT_HISTORY_LIMIT, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RESOURCE_LIMIT, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::export::ExportFormat;
use crate::models::AnalysisOptions;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line interface.
///
/// # Examples
///
/// ```bash
/// # Analyze the URLs in urls.txt and write all three exports to ./out
/// site_analyzer analyze urls.txt --out-dir ./out
///
/// # Read URLs from stdin, only produce the CSV
/// cat urls.txt | site_analyzer analyze - --format csv
///
/// # Rebuild the PDF report from a saved results.json
/// site_analyzer export ./out/results.json --format pdf --charts-dir ./charts
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "site_analyzer",
    version,
    about = "Submits URLs to a website analysis service and exports the results."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit URLs for analysis, wait for the job, and export the results
    Analyze(Config),
    /// Re-export a saved results.json without contacting the service
    Export(ExportArgs),
    /// Print historical analysis records kept by the service
    History {
        #[command(flatten)]
        service: ServiceArgs,
        /// Maximum number of records to fetch
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Delete the service's historical analysis records
    ClearHistory {
        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Check that the analysis service is reachable
    Health {
        #[command(flatten)]
        service: ServiceArgs,
    },
}

/// Connection settings for the analysis service.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Base address of the analysis service
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Default for ServiceArgs {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Library configuration for one analysis run.
///
/// Parsed from the `analyze` subcommand, or constructed programmatically.
///
/// # Examples
///
/// ```no_run
/// use site_analyzer::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     file: PathBuf::from("urls.txt"),
///     out_dir: PathBuf::from("./exports"),
///     resource_limit: 20,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// File to read URLs from, one per line (`-` for stdin)
    #[arg(value_parser)]
    pub file: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Skip sub-resource sizing (images, scripts, stylesheets)
    #[arg(long = "no-fetch-resources", action = ArgAction::SetFalse)]
    pub fetch_resources: bool,

    /// Cap on sub-resources counted per site (5-30)
    #[arg(long, default_value_t = DEFAULT_RESOURCE_LIMIT)]
    pub resource_limit: u32,

    /// Skip extended network probing
    #[arg(long = "no-check-advanced", action = ArgAction::SetFalse)]
    pub check_advanced: bool,

    /// Delay between status queries in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Give up on the job after this many seconds (unbounded when omitted)
    #[arg(long)]
    pub poll_timeout_secs: Option<u64>,

    /// Directory the exports are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Export format (repeatable); all formats when omitted
    #[arg(long = "format", value_enum)]
    pub formats: Vec<ExportFormat>,

    /// Directory holding chart snapshots (`<chart>-chart.png`) for the PDF report
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Serve job progress on http://127.0.0.1:<port>/status
    #[arg(long)]
    pub status_port: Option<u16>,
}

impl Config {
    /// Analysis options sent with the submission.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            fetch_resources: self.fetch_resources,
            resource_limit: self.resource_limit,
            check_advanced: self.check_advanced,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }

    /// Requested export formats, defaulting to all of them.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        resolve_formats(&self.formats)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("urls.txt"),
            service: ServiceArgs::default(),
            fetch_resources: true,
            resource_limit: DEFAULT_RESOURCE_LIMIT,
            check_advanced: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_timeout_secs: None,
            out_dir: PathBuf::from("."),
            formats: Vec::new(),
            charts_dir: None,
            status_port: None,
        }
    }
}

/// Options for the offline `export` subcommand.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Structured document (results.json) produced by a previous run
    #[arg(value_parser)]
    pub input: PathBuf,

    /// Directory the exports are written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Export format (repeatable); all formats when omitted
    #[arg(long = "format", value_enum)]
    pub formats: Vec<ExportFormat>,

    /// Directory holding chart snapshots (`<chart>-chart.png`) for the PDF report
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,
}

impl ExportArgs {
    /// Requested export formats, defaulting to all of them.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        resolve_formats(&self.formats)
    }
}

fn resolve_formats(requested: &[ExportFormat]) -> Vec<ExportFormat> {
    if requested.is_empty() {
        return ExportFormat::all().to_vec();
    }
    let mut formats = Vec::with_capacity(requested.len());
    for format in requested {
        if !formats.contains(format) {
            formats.push(*format);
        }
    }
    formats
}
