//! Per-site analysis record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Known record keys produced by the analysis service.
pub mod fields {
    pub const URL: &str = "url";
    pub const IP: &str = "ip";
    pub const ERROR: &str = "error";

    // Timing breakdown (milliseconds)
    pub const DNS: &str = "dns";
    pub const TCP: &str = "tcp";
    pub const SSL: &str = "ssl";
    pub const TTFB: &str = "ttfb";
    pub const TOTAL: &str = "total";

    // Size breakdown (kilobytes)
    pub const SIZE_KB: &str = "size_kb";
    pub const IMAGES_KB: &str = "images_kb";
    pub const SCRIPTS_KB: &str = "scripts_kb";
    pub const CSS_KB: &str = "css_kb";

    // Security
    pub const SSL_SCORE: &str = "ssl_score";
    pub const SSL_SCORE_BREAKDOWN: &str = "ssl_score_breakdown";
    pub const SSL_VERSION: &str = "ssl_version";
    pub const SECURITY_HEADERS_SCORE: &str = "security_headers_score";
    pub const SECURITY_HEADERS_PRESENT: &str = "security_headers_present";
    pub const SECURITY_HEADERS_MISSING: &str = "security_headers_missing";

    // Network
    pub const CDN_PROVIDER: &str = "cdn_provider";
    pub const SERVER_LOCATION: &str = "server_location";
    pub const COMPRESSION_TYPE: &str = "compression_type";
    pub const CONNECTION_REUSE_BENEFIT: &str = "connection_reuse_benefit";
}

/// One analyzed URL.
///
/// A flat mapping from key to JSON value that keeps the key order the service
/// produced. Records are read-only once a job completes; every consumer borrows
/// them.
///
/// A key that is missing and a key holding `null` both mean "not measured".
/// The typed accessors (`value`, `number`, `text`) fold the two together, while
/// `raw` exposes the stored value untouched for lossless export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(Map<String, Value>);

impl ResultRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert, appending `key` to the key order if it is new.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The stored value, including explicit `null`s.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The stored value, treating `null` as absent.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Numeric value of `key`, or `None` when absent, `null`, or not a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(Value::as_f64)
    }

    /// String value of `key`, or `None` when absent, `null`, or not a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    /// The analyzed URL, or an empty string if the record carries none.
    pub fn url(&self) -> &str {
        self.text(fields::URL).unwrap_or_default()
    }

    /// Error reported by the service for a URL it could not analyze.
    pub fn error(&self) -> Option<&str> {
        self.text(fields::ERROR)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ResultRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<ResultRecord> for Map<String, Value> {
    fn from(record: ResultRecord) -> Self {
        record.0
    }
}
