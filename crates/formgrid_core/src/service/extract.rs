//! Response extraction and required-field validation.
//!
//! # Responsibility
//! - Flatten an id-keyed response tree into a label-keyed record.
//! - Accumulate validation failures for required fields without
//!   short-circuiting.
//!
//! # Invariants
//! - Extraction is a pure function: same inputs, structurally equal output.
//! - Orphan response values (ids absent from the schema) are ignored.
//! - Required children are validated at their own level, never through the
//!   parent's emptiness check.

use crate::model::field::{Field, FieldId, FieldType};
use crate::model::value::{ExtractedRecord, ExtractedValue, ResponseMap, ResponseValue};
use std::collections::BTreeMap;

/// Extracts the value for one field from a sibling-level response map.
///
/// Sections produce a mapping from each child's label to the child's own
/// extracted value, descending into the section's id-keyed slice. Leaves
/// produce their stored value or an empty string.
pub fn extract(field: &Field, responses: &ResponseMap) -> ExtractedValue {
    if field.kind == FieldType::Section {
        let empty = ResponseMap::new();
        let slice = responses
            .get(&field.id)
            .and_then(ResponseValue::as_nested)
            .unwrap_or(&empty);
        let mut nested = BTreeMap::new();
        for child in field.children() {
            nested.insert(record_key(child), extract(child, slice));
        }
        return ExtractedValue::Nested(nested);
    }

    match responses.get(&field.id) {
        Some(ResponseValue::Text(text)) => ExtractedValue::Text(text.clone()),
        Some(ResponseValue::Selection(values)) => ExtractedValue::Selection(values.clone()),
        // A nested value under a leaf id is a referential gap; treat it as
        // absent rather than failing.
        Some(ResponseValue::Nested(_)) | None => ExtractedValue::Text(String::new()),
    }
}

/// Builds the flat, label-keyed record for a whole field list.
///
/// With `short_form` enabled, fields not marked for the short form are
/// skipped entirely: they appear neither in the record nor in validation.
pub fn extract_record(fields: &[Field], responses: &ResponseMap, short_form: bool) -> ExtractedRecord {
    let mut record = ExtractedRecord::new();
    for field in considered(fields, short_form) {
        record.insert(record_key(field), extract(field, responses));
    }
    record
}

/// Validates required fields over a field list, accumulating every failure
/// keyed by field id so all invalid fields can be highlighted at once.
///
/// Descends into sections: each required child is checked independently
/// against its own slice. A section itself fails only when it is required
/// and its whole extracted object is empty.
pub fn validate(
    fields: &[Field],
    responses: &ResponseMap,
    short_form: bool,
) -> BTreeMap<FieldId, bool> {
    let mut failures = BTreeMap::new();
    for field in considered(fields, short_form) {
        validate_field(field, responses, &mut failures);
    }
    failures
}

fn validate_field(field: &Field, responses: &ResponseMap, failures: &mut BTreeMap<FieldId, bool>) {
    let value = extract(field, responses);
    if field.required && value.is_empty() {
        failures.insert(field.id, true);
    }

    if field.kind == FieldType::Section {
        let empty = ResponseMap::new();
        let slice = responses
            .get(&field.id)
            .and_then(ResponseValue::as_nested)
            .unwrap_or(&empty);
        for child in field.children() {
            validate_field(child, slice, failures);
        }
    }
}

/// Record key for one field: its label, or a stable fallback when blank.
pub fn record_key(field: &Field) -> String {
    if field.label.is_empty() {
        format!("Field {}", field.id)
    } else {
        field.label.clone()
    }
}

fn considered(fields: &[Field], short_form: bool) -> impl Iterator<Item = &Field> {
    fields
        .iter()
        .filter(move |field| !short_form || field.display_on_short_form)
}
