//! Averages, counts and percentages over record sets.

use crate::models::{fields, ResultRecord};

/// Values treated as "no CDN" when found in `cdn_provider`.
const CDN_SENTINELS: [&str; 3] = ["None", "None detected", "Unknown"];

/// Label used for records that carry no value in a distribution.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Which values an average leaves out.
///
/// Absent (missing or `null`) and non-numeric values are always left out.
/// Zero is a real measurement under `IgnoreAbsent`. Under `IgnoreNonPositive`
/// it is treated the same as "not measured".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AveragePolicy {
    IgnoreAbsent,
    IgnoreNonPositive,
}

impl AveragePolicy {
    fn admits(self, value: f64) -> bool {
        match self {
            AveragePolicy::IgnoreAbsent => value.is_finite(),
            AveragePolicy::IgnoreNonPositive => value.is_finite() && value > 0.0,
        }
    }
}

/// Mean of the values of `key` that `policy` admits.
///
/// Returns `None` when no value is admitted, so callers can tell an empty
/// average apart from an average of zero.
pub fn average(records: &[ResultRecord], key: &str, policy: AveragePolicy) -> Option<f64> {
    let (sum, count) = records
        .iter()
        .filter_map(|r| r.number(key))
        .filter(|v| policy.admits(*v))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn count_where<F>(records: &[ResultRecord], predicate: F) -> usize
where
    F: Fn(&ResultRecord) -> bool,
{
    records.iter().filter(|r| predicate(r)).count()
}

/// `round(100 * count / total)`, or `0` for an empty total.
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = (100.0 * count as f64 / total as f64).round() as u32;
    pct
}

/// Round to the nearest integer (summary cards, printable report).
pub fn round_whole(value: f64) -> f64 {
    value.round()
}

/// Round to one decimal place (on-screen overview).
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The record names a CDN provider.
pub fn has_cdn(record: &ResultRecord) -> bool {
    record
        .text(fields::CDN_PROVIDER)
        .map(str::trim)
        .is_some_and(|p| !p.is_empty() && !CDN_SENTINELS.contains(&p))
}

/// Count of records per value of `key`, in first-seen order.
///
/// Records without a string value for `key` are counted under `"Unknown"`.
pub fn distribution(records: &[ResultRecord], key: &str) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        let label = record
            .text(key)
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_LABEL);
        match counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label.to_string(), 1)),
        }
    }
    counts
}

pub fn cdn_distribution(records: &[ResultRecord]) -> Vec<(String, usize)> {
    distribution(records, fields::CDN_PROVIDER)
}

pub fn compression_distribution(records: &[ResultRecord]) -> Vec<(String, usize)> {
    distribution(records, fields::COMPRESSION_TYPE)
}
