use formgrid_core::db::migrations::latest_version;
use formgrid_core::db::{open_db, open_db_in_memory};
use formgrid_core::{
    Field, FieldStub, FieldType, FormStoreRepository, FormSubmission, SavedTemplate,
    SqliteFormStore, StoreError, SubmissionKind,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn template_save_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let template = sample_template("Intake");
    let id = store.save_template(&template).unwrap();

    let loaded = store.get_template(id, false).unwrap().unwrap();
    assert_eq!(loaded, template);
}

#[test]
fn template_roundtrip_through_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formgrid.db");

    let template = sample_template("Persistent");
    {
        let conn = open_db(&path).unwrap();
        let store = SqliteFormStore::try_new(&conn).unwrap();
        store.save_template(&template).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();
    let loaded = store.get_template(template.id, false).unwrap().unwrap();
    assert_eq!(loaded.title, "Persistent");
}

#[test]
fn save_template_rejects_empty_field_lists() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let mut template = sample_template("Empty");
    template.fields.clear();

    let err = store.save_template(&template).unwrap_err();
    assert!(matches!(err, StoreError::EmptyTemplate));
}

#[test]
fn save_template_rejects_invalid_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let mut template = sample_template("Broken");
    // A non-choice field carrying options fails schema validation.
    template.fields[0].options = Some(Vec::new());

    let err = store.save_template(&template).unwrap_err();
    assert!(matches!(err, StoreError::InvalidTemplate(_)));
}

#[test]
fn save_template_upserts_on_same_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let mut template = sample_template("First Title");
    store.save_template(&template).unwrap();
    template.title = "Second Title".to_string();
    store.save_template(&template).unwrap();

    let all = store.list_templates(false).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Second Title");
}

#[test]
fn soft_delete_hides_then_restore_revives_templates() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let template = sample_template("Trashable");
    store.save_template(&template).unwrap();

    store.soft_delete_template(template.id).unwrap();
    assert!(store.get_template(template.id, false).unwrap().is_none());
    let trashed = store.get_template(template.id, true).unwrap().unwrap();
    assert!(trashed.is_deleted);

    store.restore_template(template.id).unwrap();
    let restored = store.get_template(template.id, false).unwrap().unwrap();
    assert!(!restored.is_deleted);
}

#[test]
fn purge_removes_the_row_for_good() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let template = sample_template("Gone");
    store.save_template(&template).unwrap();
    store.purge_template(template.id).unwrap();

    assert!(store.get_template(template.id, true).unwrap().is_none());
    let err = store.purge_template(template.id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn soft_delete_unknown_template_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let err = store.soft_delete_template(missing).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { id, .. } if id == missing));
}

#[test]
fn submissions_live_in_separate_collections() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let ad_hoc = sample_submission("Ad Hoc");
    let from_template = sample_submission("Templated");
    store
        .record_submission(SubmissionKind::AdHoc, &ad_hoc)
        .unwrap();
    store
        .record_submission(SubmissionKind::Template, &from_template)
        .unwrap();

    let recent = store.list_submissions(SubmissionKind::AdHoc, false).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].title, "Ad Hoc");

    let templated = store
        .list_submissions(SubmissionKind::Template, false)
        .unwrap();
    assert_eq!(templated.len(), 1);
    assert_eq!(templated[0].title, "Templated");
}

#[test]
fn submission_soft_delete_restore_and_purge_cycle() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let submission = sample_submission("Lifecycle");
    store
        .record_submission(SubmissionKind::AdHoc, &submission)
        .unwrap();

    store
        .soft_delete_submission(SubmissionKind::AdHoc, submission.id)
        .unwrap();
    assert!(store
        .list_submissions(SubmissionKind::AdHoc, false)
        .unwrap()
        .is_empty());
    assert_eq!(
        store
            .list_submissions(SubmissionKind::AdHoc, true)
            .unwrap()
            .len(),
        1
    );

    store
        .restore_submission(SubmissionKind::AdHoc, submission.id)
        .unwrap();
    assert_eq!(
        store
            .list_submissions(SubmissionKind::AdHoc, false)
            .unwrap()
            .len(),
        1
    );

    store
        .purge_submission(SubmissionKind::AdHoc, submission.id)
        .unwrap();
    assert!(store
        .list_submissions(SubmissionKind::AdHoc, true)
        .unwrap()
        .is_empty());
}

#[test]
fn unparsable_bodies_are_skipped_not_fatal() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let template = sample_template("Healthy");
    store.save_template(&template).unwrap();
    conn.execute(
        "INSERT INTO store_records (collection, record_uuid, body, is_deleted)
         VALUES ('templates', ?1, 'not json at all', 0);",
        [Uuid::new_v4().to_string()],
    )
    .unwrap();

    let listed = store.list_templates(false).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, template.id);
}

#[test]
fn row_flag_overrides_the_persisted_body_flag() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteFormStore::try_new(&conn).unwrap();

    let mut template = sample_template("Flagged");
    // Body claims deleted, the row says otherwise.
    template.is_deleted = true;
    let body = serde_json::to_string(&template).unwrap();
    conn.execute(
        "INSERT INTO store_records (collection, record_uuid, body, is_deleted)
         VALUES ('templates', ?1, ?2, 0);",
        rusqlite::params![template.id.to_string(), body],
    )
    .unwrap();

    let loaded = store.get_template(template.id, false).unwrap().unwrap();
    assert!(!loaded.is_deleted);
}

#[test]
fn store_rejects_uninitialized_connections() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteFormStore::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connections_missing_the_records_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteFormStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredTable("store_records"))
    ));
}

fn sample_template(title: &str) -> SavedTemplate {
    let mut field = Field::new(FieldType::Text);
    field.label = "Name".to_string();
    SavedTemplate {
        id: Uuid::new_v4(),
        title: title.to_string(),
        fields: vec![field],
        is_deleted: false,
    }
}

fn sample_submission(title: &str) -> FormSubmission {
    let field_id = Uuid::new_v4();
    let mut responses = formgrid_core::ExtractedRecord::new();
    responses.insert(
        "Name".to_string(),
        formgrid_core::ExtractedValue::Text("Ada".to_string()),
    );
    FormSubmission {
        id: Uuid::new_v4(),
        title: title.to_string(),
        submitted_at: 1_700_000_000_000,
        responses,
        fields: vec![FieldStub {
            id: field_id,
            label: "Name".to_string(),
        }],
        is_deleted: false,
    }
}
