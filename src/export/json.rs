//! Structured-document encoding.
//!
//! The record sequence as a pretty-printed JSON array (two-space indent) with
//! each record's keys in their original order. Decoding the document yields
//! the same records, values and value types.

use crate::error_handling::ExportError;
use crate::models::ResultRecord;

/// Encodes `records` as a pretty JSON array.
///
/// # Errors
///
/// Returns `ExportError::NoData` for an empty record set.
pub fn to_document(records: &[ResultRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }
    Ok(serde_json::to_string_pretty(records)?)
}

/// Decodes a document written by [`to_document`].
pub fn from_document(text: &str) -> Result<Vec<ResultRecord>, ExportError> {
    Ok(serde_json::from_str(text)?)
}
