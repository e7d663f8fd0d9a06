//! Configuration constants.
//!
//! Defaults for the service connection, polling cadence, analysis options, and
//! export artifacts.

use std::time::Duration;

/// Default base address of the analysis service.
///
/// Overridden with `--api-url` or the `SITE_ANALYZER_API_URL` environment variable.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable holding the analysis service base address.
pub const API_URL_ENV: &str = "SITE_ANALYZER_API_URL";

/// Delay between the end of one status query and the start of the next, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// [`DEFAULT_POLL_INTERVAL_MS`] as a `Duration`.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);

/// Per-request HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent sent to the analysis service.
pub const DEFAULT_USER_AGENT: &str = concat!("site_analyzer/", env!("CARGO_PKG_VERSION"));

// Analysis options accepted by the service
/// Smallest accepted cap on counted sub-resources.
pub const RESOURCE_LIMIT_MIN: u32 = 5;
/// Largest accepted cap on counted sub-resources.
pub const RESOURCE_LIMIT_MAX: u32 = 30;
/// Sub-resource cap used when none is given.
pub const DEFAULT_RESOURCE_LIMIT: u32 = 10;

/// Default number of historical records requested by `history`.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

// Export artifacts
/// Base name shared by the flat exports (`results.csv`, `results.json`).
pub const RESULTS_BASE_NAME: &str = "results";
/// Base name of the paginated report (`website_analysis_report.pdf`).
pub const REPORT_BASE_NAME: &str = "website_analysis_report";

/// Progress is logged at most this often while a job is running.
pub const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);
