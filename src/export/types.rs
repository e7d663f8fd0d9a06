//! Export types.

use clap::ValueEnum;

use crate::config::{REPORT_BASE_NAME, RESULTS_BASE_NAME};

/// Export artifact formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// Delimited table, one row per site (`results.csv`)
    Csv,
    /// Pretty-printed JSON array that round-trips losslessly (`results.json`)
    Json,
    /// Paginated report with summary, tables and charts (`website_analysis_report.pdf`)
    Pdf,
}

impl ExportFormat {
    /// Every format, in the order artifacts are written.
    pub const fn all() -> [ExportFormat; 3] {
        [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Pdf]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Fixed file name of the artifact: base name plus extension.
    pub fn file_name(&self) -> String {
        let base = match self {
            ExportFormat::Csv | ExportFormat::Json => RESULTS_BASE_NAME,
            ExportFormat::Pdf => REPORT_BASE_NAME,
        };
        format!("{}.{}", base, self.extension())
    }
}
