//! SSL score breakdown and grading.

use crate::models::{fields, ResultRecord};

/// Sub-scores of `ssl_score_breakdown`, each out of its fixed maximum.
///
/// The service names criteria with a qualifier (`"TLS Version (1.3)"`), so
/// criteria are matched by substring. A missing or non-numeric sub-score
/// counts as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SslBreakdown {
    pub valid_certificate: f64,
    pub certificate_expiry: f64,
    pub tls_version: f64,
    pub cipher_strength: f64,
}

impl SslBreakdown {
    pub const VALID_CERTIFICATE_MAX: u32 = 40;
    pub const CERTIFICATE_EXPIRY_MAX: u32 = 30;
    pub const TLS_VERSION_MAX: u32 = 20;
    pub const CIPHER_STRENGTH_MAX: u32 = 10;

    /// Compact `valid/40 expiry/30 tls/20 cipher/10` form used in report tables.
    pub fn compact(&self) -> String {
        format!(
            "{}/{} {}/{} {}/{} {}/{}",
            self.valid_certificate,
            Self::VALID_CERTIFICATE_MAX,
            self.certificate_expiry,
            Self::CERTIFICATE_EXPIRY_MAX,
            self.tls_version,
            Self::TLS_VERSION_MAX,
            self.cipher_strength,
            Self::CIPHER_STRENGTH_MAX
        )
    }
}

/// Breakdown of `record`, or `None` when it carries no breakdown mapping.
pub fn ssl_breakdown(record: &ResultRecord) -> Option<SslBreakdown> {
    let map = record.value(fields::SSL_SCORE_BREAKDOWN)?.as_object()?;
    let lookup = |criterion: &str| {
        map.iter()
            .find(|(k, _)| k.contains(criterion))
            .and_then(|(_, v)| v.as_f64())
            .unwrap_or(0.0)
    };
    Some(SslBreakdown {
        valid_certificate: lookup("Valid Certificate"),
        certificate_expiry: lookup("Certificate Expiry"),
        tls_version: lookup("TLS Version"),
        cipher_strength: lookup("Cipher Strength"),
    })
}

/// Coarse grade of a score relative to its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ScoreGrade {
    Good,
    Fair,
    Poor,
}

/// `Good` at 80% of `max` or more, `Fair` at 60% or more, else `Poor`.
pub fn score_grade(score: f64, max: f64) -> ScoreGrade {
    if max <= 0.0 {
        return ScoreGrade::Poor;
    }
    let ratio = score / max;
    if ratio >= 0.8 {
        ScoreGrade::Good
    } else if ratio >= 0.6 {
        ScoreGrade::Fair
    } else {
        ScoreGrade::Poor
    }
}
