//! Delimited-text export of extracted records.
//!
//! # Responsibility
//! - Render a flat, label-keyed record as downloadable CSV text.
//!
//! # Invariants
//! - Multi-selections join with `", "`; nested section records flatten to
//!   `key: value` pairs.
//! - Cells are always quoted, with embedded quotes doubled.

use crate::model::value::{ExtractedRecord, ExtractedValue};

/// Renders one record as CSV with a `Field,Value` header row.
pub fn export_csv(record: &ExtractedRecord) -> String {
    let mut lines = vec!["Field,Value".to_string()];
    for (key, value) in record {
        lines.push(format!(
            "{},{}",
            quote_cell(key),
            quote_cell(&display_value(value))
        ));
    }
    lines.join("\n")
}

/// Download file name for one exported form.
pub fn csv_file_name(title: &str) -> String {
    format!("{title}.csv")
}

fn display_value(value: &ExtractedValue) -> String {
    match value {
        ExtractedValue::Text(text) => text.clone(),
        ExtractedValue::Selection(values) => values.join(", "),
        ExtractedValue::Nested(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", display_value(value)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn quote_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
