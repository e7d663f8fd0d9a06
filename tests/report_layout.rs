//! Tests for the paginated report built from service records.

mod helpers;

use helpers::sample_result_records;
use site_analyzer::models::fields;
use site_analyzer::report::{
    layout, DirectorySnapshots, Item, NoSnapshots, PageGeometry, ReportAssembler,
};
use site_analyzer::{ExportError, ResultRecord};
use std::sync::Arc;
use tempfile::TempDir;

fn many_records(n: usize) -> Vec<ResultRecord> {
    (0..n)
        .map(|i| {
            ResultRecord::new()
                .with(fields::URL, format!("https://site{i}.example.com/landing"))
                .with(fields::TOTAL, 100 + i as u64)
                .with(fields::SSL_SCORE, 80)
                .with(fields::SECURITY_HEADERS_SCORE, 60)
                .with(fields::CDN_PROVIDER, if i % 2 == 0 { "Fastly" } else { "None" })
                .with(fields::COMPRESSION_TYPE, "br")
        })
        .collect()
}

/// Writes a flat-colored RGB chart as `<dir>/<name>-chart.png`.
fn write_chart(dir: &std::path::Path, name: &str, width: u32, height: u32) {
    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().expect("png header");
        let data = vec![200_u8; (width * height * 3) as usize];
        writer.write_image_data(&data).expect("png data");
    }
    std::fs::write(dir.join(format!("{name}-chart.png")), bytes).expect("write chart");
}

fn page_count(pdf: &[u8]) -> usize {
    lopdf::Document::load_mem(pdf)
        .expect("output should be a valid PDF")
        .get_pages()
        .len()
}

#[tokio::test]
async fn test_report_from_service_records() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let assembler = ReportAssembler::new(Arc::new(NoSnapshots));
    let path = assembler
        .write_report(&sample_result_records(), dir.path())
        .await
        .expect("report should be written");

    assert_eq!(path, dir.path().join("website_analysis_report.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(page_count(&bytes), 1);
}

#[tokio::test]
async fn test_long_report_spans_pages_without_overlap() {
    let records = many_records(120);
    let assembler = ReportAssembler::new(Arc::new(NoSnapshots));
    let document = assembler.assemble(&records).await.unwrap();
    let layout = assembler.layout(&document);

    assert!(layout.page_count() > 1);
    let geometry = layout.geometry;
    for page in &layout.pages {
        for pair in page.placements.windows(2) {
            assert!(pair[0].bottom() <= pair[1].top, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
        for placement in &page.placements {
            assert!(placement.bottom() <= geometry.content_bottom() + 0.01);
        }
    }

    // Every table row is placed exactly once across pages
    for (index, section) in document.sections.iter().enumerate() {
        let Some(table) = &section.table else { continue };
        let placed: usize = layout
            .pages
            .iter()
            .flat_map(|p| p.placements.iter())
            .filter(|p| p.section == index)
            .map(|p| match &p.item {
                Item::Table { rows, .. } => rows.len(),
                _ => 0,
            })
            .sum();
        assert_eq!(placed, table.rows.len(), "section {}", section.title());
    }

    let pdf = assembler.build_pdf(&records).await.unwrap();
    assert_eq!(page_count(&pdf), layout.page_count());
}

#[tokio::test]
async fn test_charts_from_directory_precede_tables() {
    let charts = TempDir::new().expect("Failed to create temp directory");
    write_chart(charts.path(), "overview", 400, 200);
    write_chart(charts.path(), "network", 300, 300);

    let assembler = ReportAssembler::new(Arc::new(DirectorySnapshots::new(charts.path())));
    let document = assembler.assemble(&many_records(3)).await.unwrap();

    let with_chart: Vec<bool> = document.sections.iter().map(|s| s.chart.is_some()).collect();
    assert_eq!(with_chart, vec![true, false, false, true, false]);

    let placed = layout(&document, PageGeometry::default());
    let items: Vec<(usize, &Item)> = placed
        .pages
        .iter()
        .flat_map(|p| p.placements.iter())
        .map(|p| (p.section, &p.item))
        .collect();

    for section in [0, 3] {
        let kinds: Vec<&Item> = items
            .iter()
            .filter(|(s, _)| *s == section)
            .map(|(_, item)| *item)
            .collect();
        assert!(matches!(kinds[0], Item::Header));
        assert!(matches!(kinds[1], Item::Chart { .. }));
        assert!(matches!(kinds[2], Item::Table { .. }));
    }
}

#[tokio::test]
async fn test_unreadable_chart_degrades_to_table_only() {
    let charts = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(charts.path().join("security-chart.png"), b"not a png").unwrap();

    let assembler = ReportAssembler::new(Arc::new(DirectorySnapshots::new(charts.path())));
    let document = assembler.assemble(&many_records(2)).await.unwrap();
    assert!(document.sections.iter().all(|s| s.chart.is_none()));
    assert!(document.sections[1].table.is_some());
}

#[tokio::test]
async fn test_empty_record_set_is_no_data() {
    let assembler = ReportAssembler::new(Arc::new(NoSnapshots));
    assert!(matches!(
        assembler.build_pdf(&[]).await,
        Err(ExportError::NoData)
    ));
}
