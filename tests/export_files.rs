//! Tests for the flat export artifacts written to disk.

mod helpers;

use helpers::sample_result_records;
use site_analyzer::export::{from_document, to_delimited, to_document, write_flat};
use site_analyzer::{export_records, ExportError, ExportFormat, ResultRecord};
use tempfile::TempDir;

#[test]
fn test_csv_cells_are_json_scalars() {
    let records = vec![
        ResultRecord::new().with("url", "a").with("total", 100),
        ResultRecord::new().with("url", "b, c").with("total", serde_json::Value::Null),
        ResultRecord::new().with("url", "d"),
    ];
    let csv = to_delimited(&records).expect("CSV should encode");
    assert_eq!(csv, "url,total\n\"a\",100\n\"b, c\",\"\"\n\"d\",\"\"");
}

#[test]
fn test_csv_file_matches_in_memory_encoding() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let records = sample_result_records();

    let path = write_flat(&records, ExportFormat::Csv, dir.path()).expect("CSV should be written");
    assert_eq!(path, dir.path().join("results.csv"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, to_delimited(&records).unwrap());

    let mut lines = written.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("url,ip,dns,tcp,ssl,ttfb,total"));
    // Nested breakdown stays a single JSON cell
    assert!(written.contains(r#"{"Valid Certificate":40"#));
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_json_file_round_trips() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let records = sample_result_records();

    let path = write_flat(&records, ExportFormat::Json, dir.path()).expect("JSON should be written");
    assert_eq!(path, dir.path().join("results.json"));

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n  {\n    \"url\""));
    let decoded = from_document(&text).expect("document should decode");
    assert_eq!(decoded, records);
    let keys: Vec<&str> = decoded[0].keys().collect();
    let original: Vec<&str> = records[0].keys().collect();
    assert_eq!(keys, original);
}

#[test]
fn test_json_keeps_zero_and_null_distinct() {
    let records = vec![ResultRecord::new()
        .with("url", "a")
        .with("dns", 0)
        .with("ip", serde_json::Value::Null)];
    let decoded = from_document(&to_document(&records).unwrap()).unwrap();
    assert_eq!(decoded[0].raw("dns"), Some(&serde_json::json!(0)));
    assert_eq!(decoded[0].raw("ip"), Some(&serde_json::Value::Null));
    assert_eq!(decoded[0].number("ip"), None);
}

#[tokio::test]
async fn test_export_records_writes_requested_formats_only() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let artifacts = export_records(
        &sample_result_records(),
        &[ExportFormat::Csv],
        dir.path(),
        None,
    )
    .await
    .expect("export should succeed");

    assert_eq!(artifacts, vec![dir.path().join("results.csv")]);
    assert!(!dir.path().join("results.json").exists());
    assert!(!dir.path().join("website_analysis_report.pdf").exists());
}

#[tokio::test]
async fn test_empty_records_write_nothing() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let out = dir.path().join("out");
    let err = export_records(&[], &ExportFormat::all(), &out, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::NoData));
    assert!(!out.exists());
}
