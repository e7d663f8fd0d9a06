//! Statistics printing for completed jobs.

use log::info;

use crate::metrics::{cdn_distribution, compression_distribution, DashboardSummary, OverviewMetrics};
use crate::models::ResultRecord;

/// Logs the dashboard summary, the overview averages and the CDN /
/// compression distributions.
pub fn log_statistics(records: &[ResultRecord]) {
    let summary = DashboardSummary::from_records(records);
    let overview = OverviewMetrics::from_records(records);
    let failed = records.iter().filter(|r| r.error().is_some()).count();

    info!(
        "Analyzed {} site{} ({} with errors)",
        summary.total_sites,
        if summary.total_sites == 1 { "" } else { "s" },
        failed
    );
    info!("{}", averages_line(&overview));
    info!(
        "CDN in use on {} site(s) ({}%)",
        summary.cdn_count, summary.cdn_percentage
    );

    log_distribution("CDN providers", &cdn_distribution(records));
    log_distribution("Compression", &compression_distribution(records));
}

fn log_distribution(title: &str, buckets: &[(String, usize)]) {
    if buckets.is_empty() {
        return;
    }
    info!("{}:", title);
    for (label, count) in buckets {
        info!("   {}: {}", label, count);
    }
}

fn averages_line(overview: &OverviewMetrics) -> String {
    format!(
        "Averages: load time {}, SSL score {}, security headers {}",
        format_average(overview.avg_total_ms, " ms"),
        format_average(overview.avg_ssl_score, ""),
        format_average(overview.avg_security_headers_score, "")
    )
}

fn format_average(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(Some(120.0), " ms"), "120 ms");
        assert_eq!(format_average(None, " ms"), "n/a");
    }

    #[test]
    fn test_averages_line_keeps_one_decimal_and_zero_scores() {
        use crate::models::fields;

        let records = vec![
            ResultRecord::new()
                .with(fields::TOTAL, 100)
                .with(fields::SSL_SCORE, 0),
            ResultRecord::new()
                .with(fields::TOTAL, 215)
                .with(fields::SSL_SCORE, 85),
        ];
        let line = averages_line(&OverviewMetrics::from_records(&records));
        assert_eq!(
            line,
            "Averages: load time 157.5 ms, SSL score 42.5, security headers n/a"
        );
    }
}
