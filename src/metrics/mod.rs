//! Summary statistics over completed record sets.
//!
//! Everything here is a pure function of its input. Absence is never read as
//! zero, and the averaging policy is always chosen explicitly by the caller
//! (see [`AveragePolicy`]).

mod aggregate;
mod security;
mod summary;

pub use aggregate::{
    average, cdn_distribution, compression_distribution, count_where, distribution, has_cdn,
    percentage, round_tenth, round_whole, AveragePolicy, UNKNOWN_LABEL,
};
pub use security::{score_grade, ssl_breakdown, ScoreGrade, SslBreakdown};
pub use summary::{DashboardSummary, OverviewMetrics, ReportSummary};
