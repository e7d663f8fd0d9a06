//! Delimited-table encoding.
//!
//! The header row is the first record's keys in insertion order. Every cell
//! is the JSON encoding of the value (strings keep their quotes, a missing or
//! `null` value becomes `""`), so commas inside strings stay inside quotes and
//! no further CSV quoting is applied. Rows are joined with `\n` and the output
//! has no trailing newline.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;

use crate::error_handling::ExportError;
use crate::models::ResultRecord;

/// Cell text for a missing or `null` value: the JSON encoding of `""`.
const EMPTY_CELL: &str = "\"\"";

/// Encodes `records` as a delimited table.
///
/// # Errors
///
/// Returns `ExportError::NoData` for an empty record set.
pub fn to_delimited(records: &[ResultRecord]) -> Result<String, ExportError> {
    let first = records.first().ok_or(ExportError::NoData)?;
    let headers: Vec<&str> = first.keys().collect();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record(&headers)?;
    for record in records {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| json_cell(record.raw(h)))
            .collect::<Result<_, _>>()?;
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// JSON scalar encoding of one cell.
fn json_cell(value: Option<&Value>) -> Result<String, serde_json::Error> {
    match value {
        None | Some(Value::Null) => Ok(EMPTY_CELL.to_string()),
        Some(v) => serde_json::to_string(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_row() {
        let records = vec![ResultRecord::new().with("url", "a").with("total", 100)];
        assert_eq!(to_delimited(&records).unwrap(), "url,total\n\"a\",100");
    }

    #[test]
    fn test_missing_and_null_cells_are_empty_strings() {
        let records = vec![
            ResultRecord::new().with("url", "a").with("ip", "1.2.3.4"),
            ResultRecord::new().with("url", "b").with("ip", Value::Null),
            ResultRecord::new().with("url", "c"),
        ];
        assert_eq!(
            to_delimited(&records).unwrap(),
            "url,ip\n\"a\",\"1.2.3.4\"\n\"b\",\"\"\n\"c\",\"\""
        );
    }

    #[test]
    fn test_header_follows_first_record_only() {
        let records = vec![
            ResultRecord::new().with("url", "a"),
            ResultRecord::new().with("extra", 1).with("url", "b"),
        ];
        assert_eq!(to_delimited(&records).unwrap(), "url\n\"a\"\n\"b\"");
    }

    #[test]
    fn test_nested_values_and_embedded_commas() {
        let records = vec![ResultRecord::new()
            .with("server_location", "Paris, FR")
            .with("security_headers_missing", json!(["CSP", "HSTS"]))
            .with("zero", 0)
            .with("ok", true)];
        assert_eq!(
            to_delimited(&records).unwrap(),
            "server_location,security_headers_missing,zero,ok\n\"Paris, FR\",[\"CSP\",\"HSTS\"],0,true"
        );
    }

    #[test]
    fn test_empty_input_is_no_data() {
        assert!(matches!(to_delimited(&[]), Err(ExportError::NoData)));
    }
}
