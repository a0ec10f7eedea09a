//! Response value and extracted record shapes.
//!
//! # Responsibility
//! - Define the id-keyed value tree collected while filling a form.
//! - Define the label-keyed record produced by extraction for persistence
//!   and export.
//!
//! # Invariants
//! - Response trees are keyed by field id at every level.
//! - Extracted records are keyed by field label at every level.
//! - Emptiness is structural: blank string, empty array, or zero-key object.

use crate::model::field::FieldId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value collected for one field while filling a form.
///
/// Untagged on the wire, matching the original scalar/array/object shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// Scalar input, or the editable text override of a display-only field.
    Text(String),
    /// Selected option values of a multi-choice field, insertion ordered.
    Selection(Vec<String>),
    /// Child values of a section, keyed by child field id.
    Nested(BTreeMap<FieldId, ResponseValue>),
}

impl ResponseValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&[String]> {
        match self {
            Self::Selection(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&BTreeMap<FieldId, ResponseValue>> {
        match self {
            Self::Nested(map) => Some(map),
            _ => None,
        }
    }
}

/// Live response state for one sibling level, keyed by field id.
pub type ResponseMap = BTreeMap<FieldId, ResponseValue>;

/// Extracted value keyed by labels instead of ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedValue {
    Text(String),
    Selection(Vec<String>),
    Nested(BTreeMap<String, ExtractedValue>),
}

impl ExtractedValue {
    /// Structural emptiness check used by required-field validation.
    ///
    /// A nested object is empty only when no child produced any value at
    /// all; partially filled sections are not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Selection(values) => values.is_empty(),
            Self::Nested(map) => map.is_empty(),
        }
    }
}

/// Flat, human-labeled record handed to persistence and export.
pub type ExtractedRecord = BTreeMap<String, ExtractedValue>;
