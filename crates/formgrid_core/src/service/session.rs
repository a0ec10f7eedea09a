//! Form session orchestration.
//!
//! # Responsibility
//! - Own the live field list, top-level layout, response map, error map,
//!   and short-form filter for one editing session.
//! - Gate submission and template saving behind validation.
//!
//! # Invariants
//! - Field list and layout change in the same operation; a layout entry
//!   never outlives its field.
//! - All mutations are synchronous whole-value replacements; two
//!   interactions can never observe a half-applied state.
//! - Nested sections are reached only through their parent's update
//!   channel, never mutated directly from here.

use crate::model::field::{Field, FieldId, FieldType};
use crate::model::layout::{LayoutEntry, LayoutIndex, GRID_COLUMNS};
use crate::model::value::{ResponseMap, ResponseValue};
use crate::repo::store_repo::{FieldStub, FormSubmission, SavedTemplate};
use crate::service::builder::{self, BuilderError, FieldEdit};
use crate::service::extract::{extract_record, validate};
use crate::service::renderer::{self, merge_child_value, RenderConfig, RenderedField};
use log::{debug, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Grid height of the static submit control in the preview.
const SUBMIT_CONTROL_HEIGHT: f64 = 2.0;

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Required fields are unfilled; submission is blocked until resolved.
    Validation(BTreeMap<FieldId, bool>),
    /// Templates with zero fields cannot be saved.
    EmptyTemplate,
    /// Referenced field is not part of this session.
    UnknownField(FieldId),
    /// Reorder sequence is not a permutation of the current field ids.
    ReorderMismatch,
    /// Builder-level edit failure.
    Builder(BuilderError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(failures) => {
                write!(f, "{} required field(s) are empty", failures.len())
            }
            Self::EmptyTemplate => write!(f, "cannot save an empty template"),
            Self::UnknownField(id) => write!(f, "field not found in session: {id}"),
            Self::ReorderMismatch => {
                write!(f, "reorder sequence must be a permutation of the field ids")
            }
            Self::Builder(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Builder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BuilderError> for SessionError {
    fn from(value: BuilderError) -> Self {
        Self::Builder(value)
    }
}

/// Short-form filtered preview: rendered fields plus the preview layout
/// with the static submit control appended below all content.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPreview {
    pub fields: Vec<RenderedField>,
    pub layout: LayoutIndex,
    /// Entry id of the static submit control inside `layout`.
    pub submit_control_id: FieldId,
}

/// One form editing session.
pub struct FormSession {
    title: String,
    fields: Vec<Field>,
    layout: LayoutIndex,
    responses: ResponseMap,
    errors: BTreeMap<FieldId, bool>,
    short_form: bool,
}

impl FormSession {
    /// Opens an empty session.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            layout: LayoutIndex::new(),
            responses: ResponseMap::new(),
            errors: BTreeMap::new(),
            short_form: false,
        }
    }

    /// Opens a session over a saved template's fields.
    ///
    /// Templates persist fields only, so the top-level layout is rebuilt by
    /// placing each field in list order.
    pub fn from_template(template: &SavedTemplate) -> Self {
        let mut session = Self::new(template.title.clone());
        for field in &template.fields {
            session.layout.place(field.id, Some(field.kind));
        }
        session.fields = template.fields.clone();
        session
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn layout(&self) -> &LayoutIndex {
        &self.layout
    }

    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    pub fn errors(&self) -> &BTreeMap<FieldId, bool> {
        &self.errors
    }

    pub fn short_form(&self) -> bool {
        self.short_form
    }

    /// Toggles the short-form filter for rendering, validation, and
    /// extraction alike.
    pub fn set_short_form(&mut self, enabled: bool) {
        self.short_form = enabled;
    }

    /// Looks up one top-level field.
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Top-level fields passing the short-form filter.
    pub fn active_fields(&self) -> impl Iterator<Item = &Field> {
        let short_form = self.short_form;
        self.fields
            .iter()
            .filter(move |field| !short_form || field.display_on_short_form)
    }

    /// Creates a field from the palette and places it in the same step.
    pub fn add_field(&mut self, kind: FieldType) -> FieldId {
        let field = Field::new(kind);
        let id = field.id;
        self.layout.place(id, Some(kind));
        self.fields.push(field);
        debug!("event=field_added module=session kind={} field_id={id}", kind.display_name());
        id
    }

    /// Replaces one field wholly with the builder's output.
    ///
    /// Section replacements also recompute the section's own layout entry
    /// height from its child count.
    pub fn update_field(&mut self, replacement: Field) -> Result<(), SessionError> {
        replacement
            .validate()
            .map_err(|err| SessionError::Builder(BuilderError::Validation(err)))?;
        let slot = self
            .fields
            .iter_mut()
            .find(|field| field.id == replacement.id)
            .ok_or(SessionError::UnknownField(replacement.id))?;
        let resize = replacement.kind == FieldType::Section;
        let child_count = replacement.child_count();
        let id = replacement.id;
        *slot = replacement;
        if resize {
            self.layout.resize_section_entry(id, child_count);
        }
        Ok(())
    }

    /// Applies a builder edit to one field and installs the replacement.
    pub fn edit_field(&mut self, id: FieldId, edit: &FieldEdit) -> Result<(), SessionError> {
        let field = self.field(id).ok_or(SessionError::UnknownField(id))?;
        let replacement = builder::apply_edit(field, edit)?;
        self.update_field(replacement)
    }

    /// Removes a field and its layout entry atomically.
    ///
    /// Removing a section drops its whole subtree and sub-layout with it.
    /// The field's response value is left behind as an orphan; extraction
    /// ignores it.
    pub fn remove_field(&mut self, id: FieldId) -> Result<(), SessionError> {
        let before = self.fields.len();
        self.fields.retain(|field| field.id != id);
        if self.fields.len() == before {
            return Err(SessionError::UnknownField(id));
        }
        self.layout.remove(id);
        self.errors.remove(&id);
        debug!("event=field_removed module=session field_id={id}");
        Ok(())
    }

    /// Re-sorts the top-level field list to match a dragged id order, so
    /// list order and visual order stay identical.
    pub fn reorder_fields(&mut self, order: &[FieldId]) -> Result<(), SessionError> {
        builder::reorder_fields(&mut self.fields, order).map_err(|()| SessionError::ReorderMismatch)
    }

    /// Installs a drag operation's resulting layout.
    ///
    /// Entries referencing unknown fields are dropped so layout entries can
    /// never outlive their field; static entries are not accepted from drag
    /// input.
    pub fn apply_layout(&mut self, entries: Vec<LayoutEntry>) {
        let filtered = entries
            .into_iter()
            .filter(|entry| !entry.is_static && self.field(entry.field_id).is_some())
            .collect();
        self.layout.replace(filtered);
    }

    /// Records the new value for one field and clears its error flag.
    pub fn set_response(&mut self, id: FieldId, value: ResponseValue) {
        self.responses.insert(id, value);
        self.errors.remove(&id);
    }

    /// Merges one child's value into a section's nested value, preserving
    /// the section's other child values.
    pub fn set_child_response(
        &mut self,
        section_id: FieldId,
        child_id: FieldId,
        value: ResponseValue,
    ) {
        let merged = merge_child_value(self.responses.get(&section_id), child_id, value);
        self.set_response(section_id, merged);
    }

    /// Renders the fill-mode preview under the short-form filter.
    ///
    /// The preview layout keeps the stored placements of active fields
    /// (synthesizing any that are missing) and appends a full-width static
    /// submit control below everything.
    pub fn preview(&self, config: &RenderConfig) -> FormPreview {
        let mut layout = LayoutIndex::new();
        for field in self.active_fields() {
            match self.layout.entry(field.id) {
                Some(entry) => layout.insert(entry.clone()),
                None => {
                    let recovered = layout.synthesized_entry(field.id);
                    layout.insert(recovered);
                }
            }
        }

        let submit_control_id = Uuid::nil();
        let submit_entry = LayoutEntry {
            field_id: submit_control_id,
            x: 0,
            y: layout.max_extent_y() + 1.0,
            w: GRID_COLUMNS,
            h: SUBMIT_CONTROL_HEIGHT,
            is_static: true,
        };
        layout.insert(submit_entry);

        let fields = self
            .active_fields()
            .map(|field| renderer::render(field, self.responses.get(&field.id), &self.errors, config))
            .collect();

        FormPreview {
            fields,
            layout,
            submit_control_id,
        }
    }

    /// Validates and submits the active fields.
    ///
    /// On failure every invalid field is flagged at once and the error map
    /// is installed on the session. On success the flat extracted record is
    /// wrapped in a submission carrying id+label field stubs.
    pub fn submit(&mut self) -> Result<FormSubmission, SessionError> {
        let failures = validate(&self.fields, &self.responses, self.short_form);
        if !failures.is_empty() {
            info!(
                "event=submit_blocked module=session failures={}",
                failures.len()
            );
            self.errors = failures.clone();
            return Err(SessionError::Validation(failures));
        }

        let record = extract_record(&self.fields, &self.responses, self.short_form);
        self.errors.clear();

        let submission = FormSubmission {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            submitted_at: epoch_ms(),
            responses: record,
            fields: self
                .active_fields()
                .map(|field| FieldStub {
                    id: field.id,
                    label: field.label.clone(),
                })
                .collect(),
            is_deleted: false,
        };
        info!(
            "event=form_submitted module=session submission_id={} fields={}",
            submission.id,
            submission.fields.len()
        );
        Ok(submission)
    }

    /// Packages the current fields as a saveable template.
    ///
    /// Saving an empty template is rejected before any store write happens.
    pub fn save_template(&self) -> Result<SavedTemplate, SessionError> {
        if self.fields.is_empty() {
            return Err(SessionError::EmptyTemplate);
        }
        let trimmed = self.title.trim();
        Ok(SavedTemplate {
            id: Uuid::new_v4(),
            title: if trimmed.is_empty() {
                "Untitled Template".to_string()
            } else {
                trimmed.to_string()
            },
            fields: self.fields.clone(),
            is_deleted: false,
        })
    }
}

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
