//! Flat exports of completed record sets.
//!
//! Two lossless encodings of the same records: a delimited table
//! ([`to_delimited`]) and a structured JSON document ([`to_document`]). Both keep
//! row order, and key order follows the first record.
//!
//! Artifacts are written with [`write_artifact`], which renders fully in memory
//! first and then atomically moves a temp file into place, so a failed export
//! never leaves a truncated or zero-byte file behind.

mod csv;
mod json;
mod types;

use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error_handling::ExportError;
use crate::models::ResultRecord;

pub use csv::to_delimited;
pub use json::{from_document, to_document};
pub use types::ExportFormat;

/// Placeholder shown for a missing or `null` value in human-readable output.
pub const ABSENT_CELL: &str = "-";

/// Human-readable cell text for a record value.
///
/// Strings are shown without quotes, numbers and booleans as written, and
/// nested values as compact JSON. Missing and `null` values become `-`,
/// never `0`.
pub fn display_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => ABSENT_CELL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(nested) => nested.to_string(),
    }
}

/// Encodes `records` in one of the flat formats.
///
/// # Errors
///
/// Returns `ExportError::NoData` for an empty record set, and
/// `ExportError::Pdf` when asked for the paginated report (see `report`).
pub fn encode_flat(records: &[ResultRecord], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => to_delimited(records),
        ExportFormat::Json => to_document(records),
        ExportFormat::Pdf => Err(ExportError::Pdf(
            "the paginated report is produced by the report assembler".to_string(),
        )),
    }
}

/// Writes the CSV or JSON artifact for `records` into `dir`.
pub fn write_flat(
    records: &[ResultRecord],
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let text = encode_flat(records, format)?;
    write_artifact(dir, format, text.as_bytes())
}

/// Atomically writes `bytes` to `dir/<format file name>`, replacing any
/// previous artifact.
pub fn write_artifact(dir: &Path, format: ExportFormat, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| ExportError::Io(e.error))?;

    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
