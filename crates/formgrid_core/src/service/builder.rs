//! Editing-mode field builder.
//!
//! # Responsibility
//! - Apply editing commands as whole-field replacements.
//! - Keep a section's child list and child layout in sync inside the same
//!   operation that changes either side.
//!
//! # Invariants
//! - Every successful edit returns a new validated `Field`; the input is
//!   never mutated.
//! - Adding a child appends the field and places its layout entry in one
//!   step; removing a child drops both atomically.
//! - Reordering applies to one sibling level only.

use crate::model::field::{Field, FieldId, FieldOption, FieldType, FieldValidationError};
use crate::model::layout::LayoutIndex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Editing command applied to one field.
///
/// Commands on nested children are routed through `EditChild`, so each
/// section stays the sole mutator of its own subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    SetLabel(String),
    ToggleRequired,
    ToggleShortForm,
    /// Appends a default option; the value is uniquified when taken.
    AppendOption,
    /// Rewrites the option at `index` in place.
    SetOption {
        index: usize,
        label: String,
        value: String,
    },
    /// Deletes the option at `index`; later indices shift down.
    RemoveOption { index: usize },
    /// Appends a child field and its layout entry in the same operation.
    /// Sections cannot be nested through this palette.
    AddChild(FieldType),
    /// Removes a child and its layout entry atomically, subtree included.
    RemoveChild(FieldId),
    /// Re-sorts the child list to match the given positional id order.
    ReorderChildren(Vec<FieldId>),
    /// Repositions one child inside the section grid.
    MoveChild { field_id: FieldId, x: u32, y: f64 },
    /// Applies an edit to one child, replacing the child wholly.
    EditChild {
        field_id: FieldId,
        edit: Box<FieldEdit>,
    },
}

/// Errors from builder edit application.
#[derive(Debug)]
pub enum BuilderError {
    /// Option edits on a type without options.
    NotAChoiceField(FieldId),
    /// Option index outside the current list.
    OptionIndexOutOfRange {
        field_id: FieldId,
        index: usize,
        len: usize,
    },
    /// Child edits on a non-section field.
    NotASection(FieldId),
    /// The section palette excludes nested sections.
    NestedSectionNotAllowed(FieldId),
    /// Referenced child does not exist at this level.
    ChildNotFound {
        section_id: FieldId,
        child_id: FieldId,
    },
    /// Reorder sequence is not a permutation of the current child ids.
    ReorderMismatch(FieldId),
    /// Resulting field failed schema validation.
    Validation(FieldValidationError),
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAChoiceField(id) => write!(f, "field {id} does not carry options"),
            Self::OptionIndexOutOfRange {
                field_id,
                index,
                len,
            } => write!(
                f,
                "option index {index} out of range for field {field_id} with {len} options"
            ),
            Self::NotASection(id) => write!(f, "field {id} is not a section"),
            Self::NestedSectionNotAllowed(id) => {
                write!(f, "section {id} cannot contain another section")
            }
            Self::ChildNotFound {
                section_id,
                child_id,
            } => write!(f, "section {section_id} has no child {child_id}"),
            Self::ReorderMismatch(id) => write!(
                f,
                "reorder sequence must be a permutation of the children of {id}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BuilderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FieldValidationError> for BuilderError {
    fn from(value: FieldValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Applies one edit, returning the complete replacement field.
pub fn apply_edit(field: &Field, edit: &FieldEdit) -> Result<Field, BuilderError> {
    let mut next = field.clone();

    match edit {
        FieldEdit::SetLabel(label) => next.label = label.clone(),
        FieldEdit::ToggleRequired => next.required = !next.required,
        FieldEdit::ToggleShortForm => {
            next.display_on_short_form = !next.display_on_short_form;
        }
        FieldEdit::AppendOption => {
            let options = choice_options_mut(&mut next)?;
            let value = unique_option_value(options);
            options.push(FieldOption::new("Option", value));
        }
        FieldEdit::SetOption {
            index,
            label,
            value,
        } => {
            let field_id = next.id;
            let options = choice_options_mut(&mut next)?;
            let len = options.len();
            let slot = options
                .get_mut(*index)
                .ok_or(BuilderError::OptionIndexOutOfRange {
                    field_id,
                    index: *index,
                    len,
                })?;
            slot.label = label.clone();
            slot.value = value.clone();
        }
        FieldEdit::RemoveOption { index } => {
            let field_id = next.id;
            let options = choice_options_mut(&mut next)?;
            if *index >= options.len() {
                return Err(BuilderError::OptionIndexOutOfRange {
                    field_id,
                    index: *index,
                    len: options.len(),
                });
            }
            // Filter rather than mark: later indices shift down by one.
            options.remove(*index);
        }
        FieldEdit::AddChild(kind) => {
            if *kind == FieldType::Section {
                return Err(BuilderError::NestedSectionNotAllowed(next.id));
            }
            let section_id = next.id;
            let (children, layout) = section_parts_mut(&mut next, section_id)?;
            let child = Field::new(*kind);
            layout.place(child.id, Some(*kind));
            children.push(child);
        }
        FieldEdit::RemoveChild(child_id) => {
            let section_id = next.id;
            let (children, layout) = section_parts_mut(&mut next, section_id)?;
            let before = children.len();
            children.retain(|child| child.id != *child_id);
            if children.len() == before {
                return Err(BuilderError::ChildNotFound {
                    section_id,
                    child_id: *child_id,
                });
            }
            layout.remove(*child_id);
        }
        FieldEdit::ReorderChildren(order) => {
            let section_id = next.id;
            let (children, _) = section_parts_mut(&mut next, section_id)?;
            reorder_fields(children, order).map_err(|()| BuilderError::ReorderMismatch(section_id))?;
        }
        FieldEdit::MoveChild { field_id, x, y } => {
            let section_id = next.id;
            let (_, layout) = section_parts_mut(&mut next, section_id)?;
            if !layout.move_entry(*field_id, *x, *y) {
                return Err(BuilderError::ChildNotFound {
                    section_id,
                    child_id: *field_id,
                });
            }
        }
        FieldEdit::EditChild { field_id, edit } => {
            let section_id = next.id;
            let (children, _) = section_parts_mut(&mut next, section_id)?;
            let slot = children
                .iter_mut()
                .find(|child| child.id == *field_id)
                .ok_or(BuilderError::ChildNotFound {
                    section_id,
                    child_id: *field_id,
                })?;
            let replacement = apply_edit(slot, edit)?;
            let resize = replacement.kind == FieldType::Section;
            let child_count = replacement.child_count();
            *slot = replacement;
            if resize {
                // A nested section's entry lives in this level's layout and
                // must track the child count.
                if let Some(layout) = next.layout.as_mut() {
                    layout.resize_section_entry(*field_id, child_count);
                }
            }
        }
    }

    next.validate()?;
    Ok(next)
}

/// Re-sorts `fields` to match the positional order of `order`.
///
/// Fails unless `order` is a permutation of the current ids. Shared with
/// the session's top-level reorder so both levels behave identically.
pub(crate) fn reorder_fields(fields: &mut Vec<Field>, order: &[FieldId]) -> Result<(), ()> {
    if order.len() != fields.len() {
        return Err(());
    }
    let mut reordered = Vec::with_capacity(fields.len());
    for id in order {
        let position = fields.iter().position(|field| field.id == *id).ok_or(())?;
        reordered.push(fields.remove(position));
    }
    if !fields.is_empty() {
        return Err(());
    }
    *fields = reordered;
    Ok(())
}

fn choice_options_mut(field: &mut Field) -> Result<&mut Vec<FieldOption>, BuilderError> {
    if !field.kind.is_choice() {
        return Err(BuilderError::NotAChoiceField(field.id));
    }
    Ok(field.options.get_or_insert_with(Vec::new))
}

fn section_parts_mut(
    field: &mut Field,
    section_id: FieldId,
) -> Result<(&mut Vec<Field>, &mut LayoutIndex), BuilderError> {
    if field.kind != FieldType::Section {
        return Err(BuilderError::NotASection(section_id));
    }
    let children = field.fields.get_or_insert_with(Vec::new);
    let layout = field.layout.get_or_insert_with(LayoutIndex::new);
    Ok((children, layout))
}

/// Default appended option value, uniquified with a numbered suffix so the
/// option-value uniqueness invariant survives repeated appends.
fn unique_option_value(options: &[FieldOption]) -> String {
    let taken = |candidate: &str| options.iter().any(|option| option.value == candidate);
    if !taken("Option") {
        return "Option".to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("Option {counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Editable representation of one field for the editing UI.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderView {
    pub field_id: FieldId,
    pub kind: FieldType,
    pub label: String,
    pub required: bool,
    pub display_on_short_form: bool,
    /// Option editor rows, present for choice types.
    pub options: Option<Vec<FieldOption>>,
    /// Nested builders for section children, in field-list order.
    pub children: Option<Vec<BuilderView>>,
    /// The section's child grid.
    pub child_layout: Option<LayoutIndex>,
    /// Add-child palette for sections: every type except `Section`.
    pub palette: Option<Vec<FieldType>>,
}

/// Builds the editable representation, recursively for sections.
pub fn builder_view(field: &Field) -> BuilderView {
    let is_section = field.kind == FieldType::Section;
    BuilderView {
        field_id: field.id,
        kind: field.kind,
        label: field.label.clone(),
        required: field.required,
        display_on_short_form: field.display_on_short_form,
        options: field.options.clone(),
        children: is_section.then(|| field.children().iter().map(builder_view).collect()),
        child_layout: field.layout.clone(),
        palette: is_section.then(section_palette),
    }
}

/// Add-child palette for sections.
pub fn section_palette() -> Vec<FieldType> {
    FieldType::PALETTE
        .into_iter()
        .filter(|kind| *kind != FieldType::Section)
        .collect()
}
