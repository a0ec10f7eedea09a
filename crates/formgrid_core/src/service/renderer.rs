//! Fill/view mode rendering.
//!
//! # Responsibility
//! - Map every field type to one normalized rendered-control variant.
//! - Descend into sections, slicing child values and errors by id.
//! - Provide the change helpers fill-mode interactions apply to values.
//!
//! # Invariants
//! - A missing layout entry for a section child is reconstructed with the
//!   default placement; rendering never fails on referential gaps.
//! - Child value changes merge into the section's nested map without
//!   discarding sibling values.
//! - Multi-choice toggling never produces duplicate selections.

use crate::model::field::{Field, FieldId, FieldOption, FieldType};
use crate::model::layout::LayoutIndex;
use crate::model::value::{ResponseMap, ResponseValue};
use crate::theme::{current_theme, Theme};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

/// Explicit configuration passed into render calls.
///
/// Carries the ambient presentation state so rendering never reads global
/// mutable UI state directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub theme: Theme,
    /// Upper bound for date inputs.
    pub today: NaiveDate,
}

impl RenderConfig {
    /// Snapshot of the process-wide theme and the current local date.
    pub fn current() -> Self {
        Self {
            theme: current_theme(),
            today: Local::now().date_naive(),
        }
    }
}

/// Register of editable display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTextStyle {
    Heading,
    Label,
    Paragraph,
}

/// Normalized control abstraction: one variant per field type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedControl {
    /// Display text, editable in place; committed text becomes the value
    /// override and the displayed content.
    DisplayText {
        style: DisplayTextStyle,
        text: String,
    },
    /// Non-interactive separator.
    Divider,
    TextInput {
        value: String,
    },
    NumberInput {
        value: String,
    },
    DateInput {
        value: String,
        /// ISO date; the UI boundary rejects or clamps anything later.
        max: String,
    },
    Dropdown {
        selected: String,
        options: Vec<FieldOption>,
    },
    RadioGroup {
        selected: String,
        options: Vec<FieldOption>,
    },
    CheckboxGroup {
        selected: Vec<String>,
        options: Vec<FieldOption>,
    },
    TagPicker {
        selected: Vec<String>,
        options: Vec<FieldOption>,
    },
    /// Section contents with their embedded grid.
    Group {
        children: Vec<RenderedField>,
        layout: LayoutIndex,
    },
}

/// One rendered field: identity, label state, and its control.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub field_id: FieldId,
    pub label: String,
    pub required: bool,
    pub error: bool,
    pub control: RenderedControl,
}

/// Renders one field against its value slice and error flags.
///
/// `value` is this field's own slice of the sibling-level response map;
/// `errors` is keyed by field id, so every nesting level reads only its own
/// entries.
pub fn render(
    field: &Field,
    value: Option<&ResponseValue>,
    errors: &BTreeMap<FieldId, bool>,
    config: &RenderConfig,
) -> RenderedField {
    let control = match field.kind {
        FieldType::Header => display_text(DisplayTextStyle::Heading, field, value),
        FieldType::Label => display_text(DisplayTextStyle::Label, field, value),
        FieldType::Paragraph => display_text(DisplayTextStyle::Paragraph, field, value),
        FieldType::Linebreak => RenderedControl::Divider,
        FieldType::Text => RenderedControl::TextInput {
            value: scalar(value),
        },
        FieldType::Number => RenderedControl::NumberInput {
            value: scalar(value),
        },
        FieldType::Date => RenderedControl::DateInput {
            value: scalar(value),
            max: config.today.format("%Y-%m-%d").to_string(),
        },
        FieldType::Dropdown => RenderedControl::Dropdown {
            selected: scalar(value),
            options: options(field),
        },
        FieldType::MultipleChoice => RenderedControl::RadioGroup {
            selected: scalar(value),
            options: options(field),
        },
        FieldType::Checkboxes => RenderedControl::CheckboxGroup {
            selected: selection(value),
            options: options(field),
        },
        FieldType::Tags => RenderedControl::TagPicker {
            selected: selection(value),
            options: options(field),
        },
        FieldType::Section => render_section(field, value, errors, config),
    };

    RenderedField {
        field_id: field.id,
        label: field.label.clone(),
        required: field.required,
        error: errors.get(&field.id).copied().unwrap_or(false),
        control,
    }
}

fn render_section(
    field: &Field,
    value: Option<&ResponseValue>,
    errors: &BTreeMap<FieldId, bool>,
    config: &RenderConfig,
) -> RenderedControl {
    let empty = ResponseMap::new();
    let slice = value.and_then(ResponseValue::as_nested).unwrap_or(&empty);

    let mut layout = field.layout.clone().unwrap_or_default();
    let mut children = Vec::with_capacity(field.child_count());
    for child in field.children() {
        if !layout.contains(child.id) {
            let recovered = layout.synthesized_entry(child.id);
            layout.insert(recovered);
        }
        children.push(render(child, slice.get(&child.id), errors, config));
    }

    RenderedControl::Group { children, layout }
}

fn display_text(
    style: DisplayTextStyle,
    field: &Field,
    value: Option<&ResponseValue>,
) -> RenderedControl {
    let override_text = value.and_then(ResponseValue::as_text).filter(|text| !text.is_empty());
    RenderedControl::DisplayText {
        style,
        text: override_text.unwrap_or(&field.label).to_string(),
    }
}

fn scalar(value: Option<&ResponseValue>) -> String {
    value
        .and_then(ResponseValue::as_text)
        .unwrap_or_default()
        .to_string()
}

fn selection(value: Option<&ResponseValue>) -> Vec<String> {
    value
        .and_then(ResponseValue::as_selection)
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

fn options(field: &Field) -> Vec<FieldOption> {
    field.options.clone().unwrap_or_default()
}

/// Toggles one option value in a multi-choice selection.
///
/// Adds the value when absent, removes it when present; the relative order
/// of the remaining selections is preserved and duplicates never appear.
pub fn toggle_selection(current: &[String], option_value: &str) -> Vec<String> {
    if current.iter().any(|value| value == option_value) {
        current
            .iter()
            .filter(|value| value.as_str() != option_value)
            .cloned()
            .collect()
    } else {
        let mut next = current.to_vec();
        next.push(option_value.to_string());
        next
    }
}

/// Clamps a date input to the configured upper bound.
///
/// Future dates collapse to today; values that do not parse as ISO dates
/// pass through unchanged (the date control cannot produce them).
pub fn clamp_date(input: &str, config: &RenderConfig) -> String {
    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) if date > config.today => config.today.format("%Y-%m-%d").to_string(),
        _ => input.to_string(),
    }
}

/// Merges one child's new value into a section's nested value, preserving
/// every sibling value already present.
pub fn merge_child_value(
    section_value: Option<&ResponseValue>,
    child_id: FieldId,
    new_value: ResponseValue,
) -> ResponseValue {
    let mut map = section_value
        .and_then(ResponseValue::as_nested)
        .cloned()
        .unwrap_or_default();
    map.insert(child_id, new_value);
    ResponseValue::Nested(map)
}
