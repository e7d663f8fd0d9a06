//! Per-section tables of the printable report.

use crate::export::{display_cell, ABSENT_CELL};
use crate::metrics::{score_grade, ssl_breakdown, ReportSummary};
use crate::models::{fields, ResultRecord};

/// Number of leading keys shown in the raw-data snapshot.
pub const RAW_SNAPSHOT_KEYS: usize = 8;

/// A plain text table. `head` is repeated on every page the table spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub head: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn with_head<const N: usize>(head: [&str; N], rows: Vec<Vec<String>>) -> Self {
        Self {
            head: Some(head.iter().map(|h| h.to_string()).collect()),
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.head
            .as_ref()
            .map(Vec::len)
            .into_iter()
            .chain(self.rows.iter().map(Vec::len))
            .max()
            .unwrap_or(0)
    }

    /// Column widths summing to `total`, proportional to each column's
    /// longest cell (clamped so no column collapses or dominates).
    pub fn column_widths(&self, total: f32) -> Vec<f32> {
        let columns = self.column_count();
        if columns == 0 {
            return Vec::new();
        }
        let weights: Vec<f32> = (0..columns)
            .map(|c| {
                let longest = self
                    .head
                    .iter()
                    .chain(self.rows.iter())
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                longest.clamp(4, 28) as f32
            })
            .collect();
        let sum: f32 = weights.iter().sum();
        weights.iter().map(|w| total * w / sum).collect()
    }
}

/// Host part of a URL: scheme and a leading `www.` dropped, path cut off.
pub fn short_host(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.split('/').next().unwrap_or(rest)
}

fn cell(record: &ResultRecord, key: &str) -> String {
    display_cell(record.value(key))
}

/// A 0-100 score with its grade appended, e.g. `90 (Good)`.
fn graded_cell(record: &ResultRecord, key: &str) -> String {
    match record.number(key) {
        Some(score) => format!("{} ({})", cell(record, key), score_grade(score, 100.0)),
        None => cell(record, key),
    }
}

pub fn summary_table(records: &[ResultRecord]) -> Table {
    let rows = ReportSummary::from_records(records)
        .rows()
        .into_iter()
        .map(|(label, value)| vec![label.to_string(), value])
        .collect();
    Table { head: None, rows }
}

pub fn security_table(records: &[ResultRecord]) -> Table {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                short_host(r.url()).to_string(),
                graded_cell(r, fields::SSL_SCORE),
                graded_cell(r, fields::SECURITY_HEADERS_SCORE),
                cell(r, fields::SSL_VERSION),
                cell(r, fields::COMPRESSION_TYPE),
                ssl_breakdown(r)
                    .map(|b| b.compact())
                    .unwrap_or_else(|| ABSENT_CELL.to_string()),
            ]
        })
        .collect();
    Table::with_head(
        [
            "Website",
            "SSL Score",
            "Headers Score",
            "TLS Version",
            "Compression",
            "SSL Breakdown",
        ],
        rows,
    )
}

pub fn performance_table(records: &[ResultRecord]) -> Table {
    let rows = records
        .iter()
        .map(|r| {
            let mut row = vec![short_host(r.url()).to_string()];
            row.extend(
                [fields::DNS, fields::TCP, fields::SSL, fields::TTFB, fields::TOTAL]
                    .iter()
                    .map(|k| cell(r, k)),
            );
            row
        })
        .collect();
    Table::with_head(["Website", "DNS", "TCP", "SSL", "TTFB", "Total (ms)"], rows)
}

pub fn network_table(records: &[ResultRecord]) -> Table {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                short_host(r.url()).to_string(),
                cell(r, fields::IP),
                cell(r, fields::CDN_PROVIDER),
                cell(r, fields::SERVER_LOCATION),
            ]
        })
        .collect();
    Table::with_head(["Website", "IP", "CDN Provider", "Server Location"], rows)
}

/// The first [`RAW_SNAPSHOT_KEYS`] keys of the first record, for every record.
pub fn raw_snapshot_table(records: &[ResultRecord]) -> Option<Table> {
    let keys: Vec<&str> = records.first()?.keys().take(RAW_SNAPSHOT_KEYS).collect();
    if keys.is_empty() {
        return None;
    }
    let rows = records
        .iter()
        .map(|r| keys.iter().map(|k| display_cell(r.raw(k))).collect())
        .collect();
    Some(Table {
        head: Some(keys.iter().map(|k| k.to_string()).collect()),
        rows,
    })
}
