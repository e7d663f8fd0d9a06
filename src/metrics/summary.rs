//! Summary values as shown by each consumer.
//!
//! Each consumer picks its own averaging policy and rounding:
//!
//! | Consumer            | Policy              | Rounding    |
//! |---------------------|---------------------|-------------|
//! | `DashboardSummary`  | `IgnoreNonPositive` | whole       |
//! | `OverviewMetrics`   | `IgnoreAbsent`      | one decimal |
//! | `ReportSummary`     | `IgnoreAbsent`      | whole       |

use serde::Serialize;

use super::aggregate::{average, count_where, has_cdn, percentage, round_tenth, round_whole};
use super::AveragePolicy;
use crate::models::{fields, ResultRecord};

/// Summary cards shown above the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_sites: usize,
    pub avg_total_ms: Option<f64>,
    pub avg_ssl_score: Option<f64>,
    pub avg_security_headers_score: Option<f64>,
    pub cdn_count: usize,
    pub cdn_percentage: u32,
}

impl DashboardSummary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        // A 0 in these fields means the service could not measure them.
        let avg = |key| average(records, key, AveragePolicy::IgnoreNonPositive).map(round_whole);
        let cdn_count = count_where(records, has_cdn);
        Self {
            total_sites: records.len(),
            avg_total_ms: avg(fields::TOTAL),
            avg_ssl_score: avg(fields::SSL_SCORE),
            avg_security_headers_score: avg(fields::SECURITY_HEADERS_SCORE),
            cdn_count,
            cdn_percentage: percentage(cdn_count, records.len()),
        }
    }
}

/// Overview panel metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub avg_total_ms: Option<f64>,
    pub avg_ssl_score: Option<f64>,
    pub avg_security_headers_score: Option<f64>,
    pub cdn_count: usize,
    pub total_sites: usize,
}

impl OverviewMetrics {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let avg = |key| average(records, key, AveragePolicy::IgnoreAbsent).map(round_tenth);
        Self {
            avg_total_ms: avg(fields::TOTAL),
            avg_ssl_score: avg(fields::SSL_SCORE),
            avg_security_headers_score: avg(fields::SECURITY_HEADERS_SCORE),
            cdn_count: count_where(records, has_cdn),
            total_sites: records.len(),
        }
    }
}

/// Summary table of the printable report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_sites: usize,
    pub avg_ssl_score: Option<f64>,
    pub avg_total_ms: Option<f64>,
    pub cdn_count: usize,
}

impl ReportSummary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let avg = |key| average(records, key, AveragePolicy::IgnoreAbsent).map(round_whole);
        Self {
            total_sites: records.len(),
            avg_ssl_score: avg(fields::SSL_SCORE),
            avg_total_ms: avg(fields::TOTAL),
            cdn_count: count_where(records, has_cdn),
        }
    }

    /// `(label, value)` rows in display order. Empty averages show `-`.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Websites Analyzed", self.total_sites.to_string()),
            ("Average SSL Score", format_optional(self.avg_ssl_score, "/100")),
            ("Average Total Load Time", format_optional(self.avg_total_ms, " ms")),
            (
                "Websites with CDN",
                format!("{}/{}", self.cdn_count, self.total_sites),
            ),
        ]
    }
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "-".to_string(),
    }
}
