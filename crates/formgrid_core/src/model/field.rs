//! Field schema model.
//!
//! # Responsibility
//! - Define the recursive field node shared by editing and fill modes.
//! - Provide constructors with the palette defaults for each field type.
//!
//! # Invariants
//! - `id` is stable for the field's lifetime and never reused.
//! - Option values are unique within one field.
//! - Child ids are unique within their immediate sibling list.
//! - Layout entries at any level never outlive their field.

use crate::model::layout::LayoutIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one field node.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type FieldId = Uuid;

/// Closed set of field type tags.
///
/// Wire names match the original schema (`multipleChoice`, `linebreak`, ...).
/// Adding a type means extending this enum plus the builder, renderer, and
/// height-table matches in exactly one place each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Large heading text, display only.
    Header,
    /// Static label text, display only.
    Label,
    /// Descriptive paragraph text, display only.
    Paragraph,
    /// Visual separator, renders nothing interactive.
    Linebreak,
    /// Free text input.
    Text,
    /// Numeric input, value kept as string.
    Number,
    /// Calendar date input, capped at the current date.
    Date,
    /// Single choice from options via select control.
    Dropdown,
    /// Single choice from options via radio group.
    MultipleChoice,
    /// Multi choice from options via checkbox group.
    Checkboxes,
    /// Multi choice from options via tag picker.
    Tags,
    /// Container grouping child fields with their own sub-layout.
    Section,
}

impl FieldType {
    /// All palette entries in toolbox order.
    pub const PALETTE: [FieldType; 12] = [
        FieldType::Header,
        FieldType::Label,
        FieldType::Paragraph,
        FieldType::Linebreak,
        FieldType::Dropdown,
        FieldType::Tags,
        FieldType::Checkboxes,
        FieldType::MultipleChoice,
        FieldType::Text,
        FieldType::Number,
        FieldType::Section,
        FieldType::Date,
    ];

    /// Returns whether this type renders static content without input.
    pub fn is_display_only(self) -> bool {
        matches!(
            self,
            FieldType::Header | FieldType::Label | FieldType::Paragraph | FieldType::Linebreak
        )
    }

    /// Returns whether this type selects from an ordered option list.
    pub fn is_choice(self) -> bool {
        matches!(
            self,
            FieldType::Dropdown
                | FieldType::MultipleChoice
                | FieldType::Checkboxes
                | FieldType::Tags
        )
    }

    /// Returns whether this type selects multiple option values.
    pub fn is_multi_choice(self) -> bool {
        matches!(self, FieldType::Checkboxes | FieldType::Tags)
    }

    /// Returns whether this type binds a user-entered value.
    pub fn is_input(self) -> bool {
        matches!(self, FieldType::Text | FieldType::Number | FieldType::Date) || self.is_choice()
    }

    /// Human-readable type name used for default labels and toolbox entries.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldType::Header => "Header",
            FieldType::Label => "Label",
            FieldType::Paragraph => "Paragraph",
            FieldType::Linebreak => "Linebreak",
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Dropdown => "Dropdown",
            FieldType::MultipleChoice => "MultipleChoice",
            FieldType::Checkboxes => "Checkboxes",
            FieldType::Tags => "Tags",
            FieldType::Section => "Section",
        }
    }

    /// Default grid height in row units for a freshly placed field.
    pub fn grid_height(self) -> f64 {
        match self {
            FieldType::Header
            | FieldType::Label
            | FieldType::Paragraph
            | FieldType::Linebreak
            | FieldType::Text
            | FieldType::Number
            | FieldType::Date => 7.3,
            FieldType::Dropdown
            | FieldType::MultipleChoice
            | FieldType::Checkboxes
            | FieldType::Tags => 11.0,
            FieldType::Section => 11.7,
        }
    }
}

/// One entry in a choice field's ordered option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Text shown to the user.
    pub label: String,
    /// Internal value recorded on selection. Unique within the field.
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Validation errors for field schema nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    /// Field id is the nil uuid.
    NilId,
    /// Two options within one field share the same value.
    DuplicateOptionValue { field_id: FieldId, value: String },
    /// Options present on a type that does not select from options.
    OptionsNotAllowed { field_id: FieldId, kind: FieldType },
    /// Children or a child layout present on a non-section type.
    ChildrenNotAllowed { field_id: FieldId, kind: FieldType },
    /// Two immediate children share an id.
    DuplicateChildId { section_id: FieldId, child_id: FieldId },
    /// A layout entry references no field in the sibling list.
    OrphanLayoutEntry { section_id: FieldId, field_id: FieldId },
}

impl Display for FieldValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "field id must not be the nil uuid"),
            Self::DuplicateOptionValue { field_id, value } => {
                write!(f, "field {field_id} has duplicate option value `{value}`")
            }
            Self::OptionsNotAllowed { field_id, kind } => write!(
                f,
                "field {field_id} of type {} cannot carry options",
                kind.display_name()
            ),
            Self::ChildrenNotAllowed { field_id, kind } => write!(
                f,
                "field {field_id} of type {} cannot carry child fields",
                kind.display_name()
            ),
            Self::DuplicateChildId {
                section_id,
                child_id,
            } => write!(f, "section {section_id} has duplicate child id {child_id}"),
            Self::OrphanLayoutEntry {
                section_id,
                field_id,
            } => write!(
                f,
                "section {section_id} layout references missing field {field_id}"
            ),
        }
    }
}

impl Error for FieldValidationError {}

/// One schema node: a leaf control or a `Section` container of child fields.
///
/// Mutation style is whole-node replacement: every edit constructs a new
/// `Field` value instead of patching shared state in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Stable unique id, generated at creation time.
    pub id: FieldId,
    /// Serialized as `type` to match the external schema naming.
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Display text; doubles as the default value for display-only types and
    /// as the key used when flattening responses.
    pub label: String,
    /// Only meaningful for input-bearing types.
    #[serde(default)]
    pub required: bool,
    /// Participates in the short-form filter when set.
    #[serde(rename = "displayOnShortForm", default)]
    pub display_on_short_form: bool,
    /// Ordered options; present only for choice-bearing types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Ordered child fields; present only for `Section`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    /// Layout index scoped to this section's children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutIndex>,
}

impl Field {
    /// Creates a field with a generated id and the palette defaults for
    /// its type: `required = false`, two starter options for choice types,
    /// and empty children plus an empty layout for sections.
    pub fn new(kind: FieldType) -> Self {
        // Uuid::new_v4 cannot be nil, so with_id cannot fail here.
        Self::with_id(Uuid::new_v4(), kind).unwrap_or_else(|_| unreachable!())
    }

    /// Creates a field with a caller-provided stable id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: FieldId, kind: FieldType) -> Result<Self, FieldValidationError> {
        if id.is_nil() {
            return Err(FieldValidationError::NilId);
        }
        Ok(Self {
            id,
            kind,
            label: format!("{} Field", kind.display_name()),
            required: false,
            display_on_short_form: false,
            options: kind.is_choice().then(|| {
                vec![
                    FieldOption::new("Option 1", "option_1"),
                    FieldOption::new("Option 2", "option_2"),
                ]
            }),
            fields: (kind == FieldType::Section).then(Vec::new),
            layout: (kind == FieldType::Section).then(LayoutIndex::new),
        })
    }

    /// Immediate children, empty for non-section fields.
    pub fn children(&self) -> &[Field] {
        self.fields.as_deref().unwrap_or(&[])
    }

    /// Number of immediate children.
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Looks up one immediate child by id.
    pub fn child(&self, id: FieldId) -> Option<&Field> {
        self.children().iter().find(|child| child.id == id)
    }

    /// Checks structural invariants on this node and its whole subtree.
    ///
    /// A child without a layout entry is tolerated here: stale layout must
    /// never block rendering, and the renderer synthesizes a placement. The
    /// converse (an entry without a field) is rejected.
    pub fn validate(&self) -> Result<(), FieldValidationError> {
        if self.id.is_nil() {
            return Err(FieldValidationError::NilId);
        }

        if let Some(options) = &self.options {
            if !self.kind.is_choice() {
                return Err(FieldValidationError::OptionsNotAllowed {
                    field_id: self.id,
                    kind: self.kind,
                });
            }
            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.value.as_str()) {
                    return Err(FieldValidationError::DuplicateOptionValue {
                        field_id: self.id,
                        value: option.value.clone(),
                    });
                }
            }
        }

        if self.kind != FieldType::Section && (self.fields.is_some() || self.layout.is_some()) {
            return Err(FieldValidationError::ChildrenNotAllowed {
                field_id: self.id,
                kind: self.kind,
            });
        }

        let mut child_ids = HashSet::new();
        for child in self.children() {
            if !child_ids.insert(child.id) {
                return Err(FieldValidationError::DuplicateChildId {
                    section_id: self.id,
                    child_id: child.id,
                });
            }
            child.validate()?;
        }

        if let Some(layout) = &self.layout {
            for entry in layout.iter() {
                if !child_ids.contains(&entry.field_id) {
                    return Err(FieldValidationError::OrphanLayoutEntry {
                        section_id: self.id,
                        field_id: entry.field_id,
                    });
                }
            }
        }

        Ok(())
    }
}
