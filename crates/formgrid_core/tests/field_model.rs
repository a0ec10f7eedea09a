use formgrid_core::{Field, FieldOption, FieldType, FieldValidationError, LayoutIndex};
use uuid::Uuid;

#[test]
fn new_field_carries_palette_defaults() {
    let field = Field::new(FieldType::Text);

    assert!(!field.id.is_nil());
    assert_eq!(field.kind, FieldType::Text);
    assert_eq!(field.label, "Text Field");
    assert!(!field.required);
    assert!(!field.display_on_short_form);
    assert!(field.options.is_none());
    assert!(field.fields.is_none());
    assert!(field.layout.is_none());
}

#[test]
fn choice_fields_start_with_two_options() {
    for kind in [
        FieldType::Dropdown,
        FieldType::MultipleChoice,
        FieldType::Checkboxes,
        FieldType::Tags,
    ] {
        let field = Field::new(kind);
        let options = field.options.as_ref().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0], FieldOption::new("Option 1", "option_1"));
        assert_eq!(options[1], FieldOption::new("Option 2", "option_2"));
    }
}

#[test]
fn section_starts_with_empty_children_and_layout() {
    let section = Field::new(FieldType::Section);

    assert_eq!(section.child_count(), 0);
    assert!(section.layout.as_ref().unwrap().is_empty());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let result = Field::with_id(Uuid::nil(), FieldType::Text);
    assert!(matches!(result, Err(FieldValidationError::NilId)));
}

#[test]
fn field_type_serializes_with_camel_case_tags() {
    assert_eq!(
        serde_json::to_string(&FieldType::MultipleChoice).unwrap(),
        "\"multipleChoice\""
    );
    assert_eq!(
        serde_json::to_string(&FieldType::Linebreak).unwrap(),
        "\"linebreak\""
    );
    assert_eq!(
        serde_json::from_str::<FieldType>("\"checkboxes\"").unwrap(),
        FieldType::Checkboxes
    );
}

#[test]
fn field_serializes_with_external_key_names() {
    let field = Field::new(FieldType::Number);
    let json = serde_json::to_value(&field).unwrap();

    assert_eq!(json["type"], "number");
    assert_eq!(json["displayOnShortForm"], false);
    assert!(json.get("options").is_none());
    assert!(json.get("fields").is_none());
}

#[test]
fn field_roundtrips_through_json() {
    let mut section = Field::new(FieldType::Section);
    let child = Field::new(FieldType::Dropdown);
    section
        .layout
        .as_mut()
        .unwrap()
        .place(child.id, Some(child.kind));
    section.fields.as_mut().unwrap().push(child);

    let json = serde_json::to_string(&section).unwrap();
    let restored: Field = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, section);
}

#[test]
fn validate_rejects_duplicate_option_values() {
    let mut field = Field::new(FieldType::Checkboxes);
    field
        .options
        .as_mut()
        .unwrap()
        .push(FieldOption::new("Dup", "option_1"));

    let err = field.validate().unwrap_err();
    assert!(matches!(
        err,
        FieldValidationError::DuplicateOptionValue { field_id, ref value }
            if field_id == field.id && value == "option_1"
    ));
}

#[test]
fn validate_rejects_options_on_non_choice_type() {
    let mut field = Field::new(FieldType::Text);
    field.options = Some(vec![FieldOption::new("A", "a")]);

    let err = field.validate().unwrap_err();
    assert!(matches!(err, FieldValidationError::OptionsNotAllowed { .. }));
}

#[test]
fn validate_rejects_children_on_non_section_type() {
    let mut field = Field::new(FieldType::Header);
    field.fields = Some(vec![Field::new(FieldType::Text)]);

    let err = field.validate().unwrap_err();
    assert!(matches!(err, FieldValidationError::ChildrenNotAllowed { .. }));
}

#[test]
fn validate_rejects_duplicate_child_ids() {
    let mut section = Field::new(FieldType::Section);
    let child = Field::new(FieldType::Text);
    section.fields = Some(vec![child.clone(), child.clone()]);

    let err = section.validate().unwrap_err();
    assert!(matches!(
        err,
        FieldValidationError::DuplicateChildId { child_id, .. } if child_id == child.id
    ));
}

#[test]
fn validate_rejects_orphan_layout_entries() {
    let mut section = Field::new(FieldType::Section);
    let ghost_id = Uuid::new_v4();
    section.layout = Some({
        let mut layout = LayoutIndex::new();
        layout.place(ghost_id, None);
        layout
    });

    let err = section.validate().unwrap_err();
    assert!(matches!(
        err,
        FieldValidationError::OrphanLayoutEntry { field_id, .. } if field_id == ghost_id
    ));
}

#[test]
fn validate_tolerates_child_without_layout_entry() {
    let mut section = Field::new(FieldType::Section);
    section.fields = Some(vec![Field::new(FieldType::Text)]);

    section.validate().unwrap();
}

#[test]
fn palette_covers_every_type_once() {
    assert_eq!(FieldType::PALETTE.len(), 12);
    let mut seen = std::collections::HashSet::new();
    for kind in FieldType::PALETTE {
        assert!(seen.insert(kind));
    }
}

#[test]
fn type_predicates_partition_the_palette() {
    for kind in FieldType::PALETTE {
        if kind == FieldType::Section {
            assert!(!kind.is_display_only());
            assert!(!kind.is_input());
        } else {
            assert_ne!(kind.is_display_only(), kind.is_input());
        }
        if kind.is_multi_choice() {
            assert!(kind.is_choice());
        }
    }
}
