//! Printable report assembly.
//!
//! [`ReportAssembler`] turns a completed record set into a paginated PDF:
//!
//! 1. [`ReportAssembler::assemble`] builds a [`ReportDocument`]: the five
//!    sections in fixed order, each with its table and, when the
//!    [`SnapshotProvider`] has one, its chart. Snapshots are captured one at a
//!    time in section order.
//! 2. [`layout`] places headers, charts and table fragments on pages.
//! 3. [`render_pdf`] draws the placements with `lopdf`.
//!
//! An empty record set yields `ExportError::NoData` and no document.

mod layout;
mod pdf;
mod snapshot;
mod tables;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::error_handling::ExportError;
use crate::export::{write_artifact, ExportFormat};
use crate::models::ResultRecord;

pub use layout::{layout, Item, Layout, PageGeometry, PageLayout, Placement};
pub use pdf::render_pdf;
pub use snapshot::{ChartId, ChartSnapshot, DirectorySnapshots, NoSnapshots, SnapshotProvider};
pub use tables::{
    network_table, performance_table, raw_snapshot_table, security_table, short_host,
    summary_table, Table, RAW_SNAPSHOT_KEYS,
};

#[cfg(test)]
pub(crate) use snapshot::encode_png;

/// Report sections, in the order they are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Summary,
    Security,
    Performance,
    Network,
    RawData,
}

impl SectionKind {
    pub const ORDER: [SectionKind; 5] = [
        SectionKind::Summary,
        SectionKind::Security,
        SectionKind::Performance,
        SectionKind::Network,
        SectionKind::RawData,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Summary => "Summary",
            SectionKind::Security => "Security Insights",
            SectionKind::Performance => "Performance Metrics",
            SectionKind::Network => "Network Overview",
            SectionKind::RawData => "Raw Data Snapshot",
        }
    }

    /// The chart embedded in this section, if any.
    pub fn chart(&self) -> Option<ChartId> {
        match self {
            SectionKind::Summary => Some(ChartId::Overview),
            SectionKind::Security => Some(ChartId::Security),
            SectionKind::Performance => Some(ChartId::Performance),
            SectionKind::Network => Some(ChartId::Network),
            SectionKind::RawData => None,
        }
    }

    fn table(&self, records: &[ResultRecord]) -> Option<Table> {
        match self {
            SectionKind::Summary => Some(summary_table(records)),
            SectionKind::Security => Some(security_table(records)),
            SectionKind::Performance => Some(performance_table(records)),
            SectionKind::Network => Some(network_table(records)),
            SectionKind::RawData => raw_snapshot_table(records),
        }
    }
}

/// One titled block of the report.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub chart: Option<ChartSnapshot>,
    pub table: Option<Table>,
}

impl Section {
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Content of one report, built per export and then discarded.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    /// Local timestamp shown under the title.
    pub generated_at: String,
    pub sections: Vec<Section>,
}

/// Builds the paginated report from records and injected chart snapshots.
pub struct ReportAssembler {
    snapshots: Arc<dyn SnapshotProvider>,
    geometry: PageGeometry,
}

impl ReportAssembler {
    pub fn new(snapshots: Arc<dyn SnapshotProvider>) -> Self {
        Self {
            snapshots,
            geometry: PageGeometry::default(),
        }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Builds the document for `records`.
    ///
    /// A chart that is not rendered or fails to capture leaves its section
    /// with the table only.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NoData` for an empty record set.
    pub async fn assemble(&self, records: &[ResultRecord]) -> Result<ReportDocument, ExportError> {
        if records.is_empty() {
            return Err(ExportError::NoData);
        }

        let mut sections = Vec::with_capacity(SectionKind::ORDER.len());
        for kind in SectionKind::ORDER {
            let chart = match kind.chart() {
                Some(chart) => match self.snapshots.capture(chart).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!("{}; \"{}\" is laid out without it", e, kind.title());
                        None
                    }
                },
                None => None,
            };
            sections.push(Section {
                kind,
                chart,
                table: kind.table(records),
            });
        }

        Ok(ReportDocument {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            sections,
        })
    }

    pub fn layout(&self, document: &ReportDocument) -> Layout {
        layout(document, self.geometry)
    }

    /// Assembles, lays out and renders the report as PDF bytes.
    pub async fn build_pdf(&self, records: &[ResultRecord]) -> Result<Vec<u8>, ExportError> {
        let document = self.assemble(records).await?;
        let layout = self.layout(&document);
        info!(
            "Report laid out on {} page(s), {} chart(s) embedded",
            layout.page_count(),
            document.sections.iter().filter(|s| s.chart.is_some()).count()
        );
        render_pdf(&document, &layout)
    }

    /// Writes `website_analysis_report.pdf` into `dir`.
    pub async fn write_report(&self, records: &[ResultRecord], dir: &Path) -> Result<PathBuf, ExportError> {
        let bytes = self.build_pdf(records).await?;
        write_artifact(dir, ExportFormat::Pdf, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::RenderingUnavailable;
    use crate::models::fields;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves a fixed snapshot for some charts, fails others, and records call order.
    struct FakeCharts {
        available: Vec<ChartId>,
        failing: Vec<ChartId>,
        calls: Mutex<Vec<ChartId>>,
    }

    #[async_trait]
    impl SnapshotProvider for FakeCharts {
        async fn capture(&self, chart: ChartId) -> Result<Option<ChartSnapshot>, RenderingUnavailable> {
            self.calls.lock().unwrap().push(chart);
            if self.failing.contains(&chart) {
                return Err(RenderingUnavailable::new(chart, "canvas detached"));
            }
            Ok(self
                .available
                .contains(&chart)
                .then(|| ChartSnapshot::from_rgb(4, 2, vec![128; 24]).unwrap()))
        }
    }

    fn records() -> Vec<ResultRecord> {
        vec![
            ResultRecord::new()
                .with(fields::URL, "https://example.com")
                .with(fields::TOTAL, 120)
                .with(fields::SSL_SCORE, 95),
            ResultRecord::new()
                .with(fields::URL, "https://down.example")
                .with(fields::ERROR, "timeout"),
        ]
    }

    #[tokio::test]
    async fn test_empty_records_are_no_data() {
        let dir = TempDir::new().unwrap();
        let assembler = ReportAssembler::new(Arc::new(NoSnapshots));
        let err = assembler.write_report(&[], dir.path()).await.unwrap_err();
        assert!(matches!(err, ExportError::NoData));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_sections_in_fixed_order_with_degraded_charts() {
        let charts = Arc::new(FakeCharts {
            available: vec![ChartId::Security, ChartId::Network],
            failing: vec![ChartId::Performance],
            calls: Mutex::new(Vec::new()),
        });
        let assembler = ReportAssembler::new(charts.clone());
        let document = assembler.assemble(&records()).await.unwrap();

        let titles: Vec<&str> = document.sections.iter().map(Section::title).collect();
        assert_eq!(
            titles,
            vec![
                "Summary",
                "Security Insights",
                "Performance Metrics",
                "Network Overview",
                "Raw Data Snapshot"
            ]
        );
        let with_chart: Vec<bool> = document.sections.iter().map(|s| s.chart.is_some()).collect();
        assert_eq!(with_chart, vec![false, true, false, true, false]);
        assert!(document.sections.iter().all(|s| s.table.is_some()));

        assert_eq!(
            *charts.calls.lock().unwrap(),
            vec![
                ChartId::Overview,
                ChartId::Security,
                ChartId::Performance,
                ChartId::Network
            ]
        );
    }

    #[tokio::test]
    async fn test_write_report_produces_pdf() {
        let dir = TempDir::new().unwrap();
        let assembler = ReportAssembler::new(Arc::new(NoSnapshots));
        let path = assembler.write_report(&records(), dir.path()).await.unwrap();
        assert!(path.ends_with("website_analysis_report.pdf"));
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
