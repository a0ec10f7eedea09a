use chrono::NaiveDate;
use formgrid_core::{
    FieldEdit, FieldType, FormSession, RenderConfig, ResponseValue, SessionError, Theme,
    GRID_COLUMNS,
};
use uuid::Uuid;

#[test]
fn add_field_places_field_and_layout_together() {
    let mut session = FormSession::new("Test");
    let id = session.add_field(FieldType::Checkboxes);

    assert_eq!(session.fields().len(), 1);
    let entry = session.layout().entry(id).unwrap();
    assert_eq!(entry.h, 11.0);
}

#[test]
fn remove_field_drops_layout_and_error_state() {
    let mut session = FormSession::new("Test");
    let keep = session.add_field(FieldType::Text);
    let drop = session.add_field(FieldType::Number);

    session.edit_field(drop, &FieldEdit::ToggleRequired).unwrap();
    // A failed submit flags the required field.
    assert!(session.submit().is_err());
    assert!(session.errors().contains_key(&drop));

    session.remove_field(drop).unwrap();
    assert!(!session.layout().contains(drop));
    assert!(!session.errors().contains_key(&drop));
    assert!(session.layout().contains(keep));

    // No layout entry may outlive its field.
    for entry in session.layout().iter() {
        assert!(session.field(entry.field_id).is_some());
    }

    let err = session.remove_field(drop).unwrap_err();
    assert!(matches!(err, SessionError::UnknownField(id) if id == drop));
}

#[test]
fn reorder_fields_applies_dragged_order() {
    let mut session = FormSession::new("Test");
    let a = session.add_field(FieldType::Text);
    let b = session.add_field(FieldType::Number);
    let c = session.add_field(FieldType::Date);

    session.reorder_fields(&[c, a, b]).unwrap();
    let order: Vec<Uuid> = session.fields().iter().map(|field| field.id).collect();
    assert_eq!(order, vec![c, a, b]);

    let err = session.reorder_fields(&[a, b]).unwrap_err();
    assert!(matches!(err, SessionError::ReorderMismatch));
}

#[test]
fn edit_field_installs_builder_output() {
    let mut session = FormSession::new("Test");
    let id = session.add_field(FieldType::Text);

    session
        .edit_field(id, &FieldEdit::SetLabel("Name".to_string()))
        .unwrap();
    assert_eq!(session.field(id).unwrap().label, "Name");

    let err = session
        .edit_field(Uuid::new_v4(), &FieldEdit::ToggleRequired)
        .unwrap_err();
    assert!(matches!(err, SessionError::UnknownField(_)));
}

#[test]
fn section_edits_resize_the_section_entry() {
    let mut session = FormSession::new("Test");
    let section = session.add_field(FieldType::Section);

    session
        .edit_field(section, &FieldEdit::AddChild(FieldType::Text))
        .unwrap();
    session
        .edit_field(section, &FieldEdit::AddChild(FieldType::Number))
        .unwrap();

    let entry = session.layout().entry(section).unwrap();
    let expected = 6.0 + 2.0 * 7.3;
    assert!((entry.h - expected).abs() < 1e-9);
}

#[test]
fn apply_layout_drops_static_and_unknown_entries() {
    let mut session = FormSession::new("Test");
    let id = session.add_field(FieldType::Text);

    let mut moved = session.layout().entry(id).unwrap().clone();
    moved.x = 6;
    let mut foreign = moved.clone();
    foreign.field_id = Uuid::new_v4();
    let mut pinned = moved.clone();
    pinned.is_static = true;

    session.apply_layout(vec![moved.clone(), foreign, pinned]);

    assert_eq!(session.layout().len(), 1);
    assert_eq!(session.layout().entry(id).unwrap().x, 6);
}

#[test]
fn set_response_clears_the_error_flag() {
    let mut session = FormSession::new("Test");
    let id = session.add_field(FieldType::Text);
    session.edit_field(id, &FieldEdit::ToggleRequired).unwrap();
    assert!(session.submit().is_err());
    assert!(session.errors().contains_key(&id));

    session.set_response(id, ResponseValue::Text("filled".to_string()));
    assert!(!session.errors().contains_key(&id));
}

#[test]
fn set_child_response_merges_into_the_section_value() {
    let mut session = FormSession::new("Test");
    let section = session.add_field(FieldType::Section);
    session
        .edit_field(section, &FieldEdit::AddChild(FieldType::Text))
        .unwrap();
    session
        .edit_field(section, &FieldEdit::AddChild(FieldType::Number))
        .unwrap();
    let first = session.field(section).unwrap().children()[0].id;
    let second = session.field(section).unwrap().children()[1].id;

    session.set_child_response(section, first, ResponseValue::Text("one".to_string()));
    session.set_child_response(section, second, ResponseValue::Text("2".to_string()));

    let nested = session
        .responses()
        .get(&section)
        .and_then(ResponseValue::as_nested)
        .unwrap();
    assert_eq!(nested.get(&first).unwrap().as_text(), Some("one"));
    assert_eq!(nested.get(&second).unwrap().as_text(), Some("2"));
}

#[test]
fn preview_appends_a_static_full_width_submit_control() {
    let mut session = FormSession::new("Test");
    let id = session.add_field(FieldType::Text);

    let preview = session.preview(&fixed_config());

    assert_eq!(preview.fields.len(), 1);
    assert_eq!(preview.fields[0].field_id, id);

    let submit = preview.layout.entry(preview.submit_control_id).unwrap();
    assert!(submit.is_static);
    assert_eq!(submit.w, GRID_COLUMNS);
    // Below every placed field.
    let field_entry = preview.layout.entry(id).unwrap();
    assert!(submit.y >= field_entry.y + field_entry.h);
}

#[test]
fn preview_honors_the_short_form_filter() {
    let mut session = FormSession::new("Test");
    let shown = session.add_field(FieldType::Text);
    let hidden = session.add_field(FieldType::Number);
    session
        .edit_field(shown, &FieldEdit::ToggleShortForm)
        .unwrap();
    session.set_short_form(true);

    let preview = session.preview(&fixed_config());
    assert_eq!(preview.fields.len(), 1);
    assert_eq!(preview.fields[0].field_id, shown);
    assert!(!preview.layout.contains(hidden));
}

#[test]
fn submit_blocks_and_flags_every_empty_required_field() {
    let mut session = FormSession::new("Test");
    let first = session.add_field(FieldType::Text);
    let second = session.add_field(FieldType::Checkboxes);
    session.edit_field(first, &FieldEdit::ToggleRequired).unwrap();
    session
        .edit_field(second, &FieldEdit::ToggleRequired)
        .unwrap();

    let err = session.submit().unwrap_err();
    match err {
        SessionError::Validation(failures) => {
            assert_eq!(failures.len(), 2);
            assert!(failures.contains_key(&first));
            assert!(failures.contains_key(&second));
        }
        other => panic!("expected a validation error, got {other}"),
    }
    assert_eq!(session.errors().len(), 2);
}

#[test]
fn successful_submit_builds_a_labeled_record_with_stubs() {
    let mut session = FormSession::new("Survey");
    let name = session.add_field(FieldType::Text);
    session
        .edit_field(name, &FieldEdit::SetLabel("Name".to_string()))
        .unwrap();
    session.edit_field(name, &FieldEdit::ToggleRequired).unwrap();
    session.set_response(name, ResponseValue::Text("Ada".to_string()));

    let submission = session.submit().unwrap();

    assert_eq!(submission.title, "Survey");
    assert!(submission.submitted_at > 0);
    assert!(!submission.is_deleted);
    assert_eq!(
        submission.responses.get("Name").unwrap().clone(),
        formgrid_core::ExtractedValue::Text("Ada".to_string())
    );
    assert_eq!(submission.fields.len(), 1);
    assert_eq!(submission.fields[0].id, name);
    assert_eq!(submission.fields[0].label, "Name");
    assert!(session.errors().is_empty());
}

#[test]
fn save_template_rejects_empty_sessions_and_trims_titles() {
    let empty = FormSession::new("   ");
    assert!(matches!(
        empty.save_template(),
        Err(SessionError::EmptyTemplate)
    ));

    let mut session = FormSession::new("  Intake  ");
    session.add_field(FieldType::Text);
    let template = session.save_template().unwrap();
    assert_eq!(template.title, "Intake");
    assert_eq!(template.fields.len(), 1);

    let mut untitled = FormSession::new("   ");
    untitled.add_field(FieldType::Text);
    assert_eq!(
        untitled.save_template().unwrap().title,
        "Untitled Template"
    );
}

#[test]
fn from_template_rebuilds_the_layout_in_field_order() {
    let mut session = FormSession::new("Original");
    session.add_field(FieldType::Text);
    session.add_field(FieldType::Checkboxes);
    let template = session.save_template().unwrap();

    let reopened = FormSession::from_template(&template);
    assert_eq!(reopened.title(), "Original");
    assert_eq!(reopened.fields().len(), 2);
    for field in reopened.fields() {
        let entry = reopened.layout().entry(field.id).unwrap();
        assert_eq!(entry.h, field.kind.grid_height());
    }
}

fn fixed_config() -> RenderConfig {
    RenderConfig {
        theme: Theme::Light,
        today: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
    }
}
