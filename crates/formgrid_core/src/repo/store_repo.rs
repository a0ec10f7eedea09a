//! Form store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist saved templates and submission records as opaque collections.
//! - Keep SQL and JSON body details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Soft delete flips `is_deleted`; rows survive until an explicit purge.
//! - Unparsable persisted bodies are skipped with a warning, never fatal:
//!   a corrupt collection degrades to an empty one.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::field::{Field, FieldId};
use crate::model::value::ExtractedRecord;
use log::warn;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from form store persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Record does not exist in the named collection.
    NotFound {
        collection: &'static str,
        id: Uuid,
    },
    /// Record body could not be serialized for storage.
    Serialize(serde_json::Error),
    /// Templates with zero fields are rejected before any write.
    EmptyTemplate,
    /// Template fields failed schema validation.
    InvalidTemplate(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "record not found in {collection}: {id}")
            }
            Self::Serialize(err) => write!(f, "failed to serialize record body: {err}"),
            Self::EmptyTemplate => write!(f, "cannot save an empty template"),
            Self::InvalidTemplate(message) => write!(f, "invalid template: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "form store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "form store requires table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Id and label of one field, kept with a submission so downstream viewers
/// can caption responses without the full field definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStub {
    pub id: FieldId,
    pub label: String,
}

/// A reusable form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTemplate {
    pub id: Uuid,
    pub title: String,
    pub fields: Vec<Field>,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
}

/// One submitted response record, ad-hoc or template-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub title: String,
    /// Submission time in epoch milliseconds.
    #[serde(rename = "submittedAt")]
    pub submitted_at: i64,
    /// Flat, label-keyed extracted record.
    pub responses: ExtractedRecord,
    pub fields: Vec<FieldStub>,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
}

/// The two submission collections the store tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    /// Ad-hoc forms built and submitted in one session.
    AdHoc,
    /// Submissions of a saved template.
    Template,
}

impl SubmissionKind {
    fn collection(self) -> &'static str {
        match self {
            Self::AdHoc => "recent_forms",
            Self::Template => "submitted_templates",
        }
    }
}

const TEMPLATE_COLLECTION: &str = "templates";

/// Repository interface for the three persisted collections.
pub trait FormStoreRepository {
    fn save_template(&self, template: &SavedTemplate) -> StoreResult<Uuid>;
    fn get_template(&self, id: Uuid, include_deleted: bool) -> StoreResult<Option<SavedTemplate>>;
    fn list_templates(&self, include_deleted: bool) -> StoreResult<Vec<SavedTemplate>>;
    fn soft_delete_template(&self, id: Uuid) -> StoreResult<()>;
    fn restore_template(&self, id: Uuid) -> StoreResult<()>;
    /// Physical removal; issued by the trash/recovery path only.
    fn purge_template(&self, id: Uuid) -> StoreResult<()>;

    fn record_submission(&self, kind: SubmissionKind, submission: &FormSubmission)
        -> StoreResult<Uuid>;
    fn list_submissions(
        &self,
        kind: SubmissionKind,
        include_deleted: bool,
    ) -> StoreResult<Vec<FormSubmission>>;
    fn soft_delete_submission(&self, kind: SubmissionKind, id: Uuid) -> StoreResult<()>;
    fn restore_submission(&self, kind: SubmissionKind, id: Uuid) -> StoreResult<()>;
    fn purge_submission(&self, kind: SubmissionKind, id: Uuid) -> StoreResult<()>;
}

/// SQLite-backed form store.
pub struct SqliteFormStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFormStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn upsert(&self, collection: &'static str, id: Uuid, body: &str, deleted: bool) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO store_records (collection, record_uuid, body, is_deleted)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, record_uuid) DO UPDATE SET
                body = excluded.body,
                is_deleted = excluded.is_deleted,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![collection, id.to_string(), body, bool_to_int(deleted)],
        )?;
        Ok(())
    }

    fn set_deleted(&self, collection: &'static str, id: Uuid, deleted: bool) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE store_records
             SET is_deleted = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?1
               AND record_uuid = ?2;",
            params![collection, id.to_string(), bool_to_int(deleted)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }

    fn purge(&self, collection: &'static str, id: Uuid) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM store_records
             WHERE collection = ?1
               AND record_uuid = ?2;",
            params![collection, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { collection, id });
        }
        Ok(())
    }

    fn load_one(
        &self,
        collection: &'static str,
        id: Uuid,
        include_deleted: bool,
    ) -> StoreResult<Option<(String, bool)>> {
        let mut stmt = self.conn.prepare(
            "SELECT body, is_deleted
             FROM store_records
             WHERE collection = ?1
               AND record_uuid = ?2
               AND (?3 = 1 OR is_deleted = 0);",
        )?;
        let mut rows = stmt.query(params![
            collection,
            id.to_string(),
            bool_to_int(include_deleted)
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_body_row(row)?));
        }
        Ok(None)
    }

    fn load_all(
        &self,
        collection: &'static str,
        include_deleted: bool,
    ) -> StoreResult<Vec<(String, bool)>> {
        let mut stmt = self.conn.prepare(
            "SELECT body, is_deleted
             FROM store_records
             WHERE collection = ?1
               AND (?2 = 1 OR is_deleted = 0)
             ORDER BY created_at DESC, record_uuid ASC;",
        )?;
        let mut rows = stmt.query(params![collection, bool_to_int(include_deleted)])?;
        let mut bodies = Vec::new();
        while let Some(row) = rows.next()? {
            bodies.push(parse_body_row(row)?);
        }
        Ok(bodies)
    }
}

impl FormStoreRepository for SqliteFormStore<'_> {
    fn save_template(&self, template: &SavedTemplate) -> StoreResult<Uuid> {
        if template.fields.is_empty() {
            return Err(StoreError::EmptyTemplate);
        }
        for field in &template.fields {
            field
                .validate()
                .map_err(|err| StoreError::InvalidTemplate(err.to_string()))?;
        }

        let body = serde_json::to_string(template)?;
        self.upsert(TEMPLATE_COLLECTION, template.id, &body, template.is_deleted)?;
        Ok(template.id)
    }

    fn get_template(&self, id: Uuid, include_deleted: bool) -> StoreResult<Option<SavedTemplate>> {
        match self.load_one(TEMPLATE_COLLECTION, id, include_deleted)? {
            Some((body, deleted)) => Ok(decode_template(&body, deleted)),
            None => Ok(None),
        }
    }

    fn list_templates(&self, include_deleted: bool) -> StoreResult<Vec<SavedTemplate>> {
        let bodies = self.load_all(TEMPLATE_COLLECTION, include_deleted)?;
        Ok(bodies
            .iter()
            .filter_map(|(body, deleted)| decode_template(body, *deleted))
            .collect())
    }

    fn soft_delete_template(&self, id: Uuid) -> StoreResult<()> {
        self.set_deleted(TEMPLATE_COLLECTION, id, true)
    }

    fn restore_template(&self, id: Uuid) -> StoreResult<()> {
        self.set_deleted(TEMPLATE_COLLECTION, id, false)
    }

    fn purge_template(&self, id: Uuid) -> StoreResult<()> {
        self.purge(TEMPLATE_COLLECTION, id)
    }

    fn record_submission(
        &self,
        kind: SubmissionKind,
        submission: &FormSubmission,
    ) -> StoreResult<Uuid> {
        let body = serde_json::to_string(submission)?;
        self.upsert(
            kind.collection(),
            submission.id,
            &body,
            submission.is_deleted,
        )?;
        Ok(submission.id)
    }

    fn list_submissions(
        &self,
        kind: SubmissionKind,
        include_deleted: bool,
    ) -> StoreResult<Vec<FormSubmission>> {
        let bodies = self.load_all(kind.collection(), include_deleted)?;
        Ok(bodies
            .iter()
            .filter_map(|(body, deleted)| decode_submission(kind, body, *deleted))
            .collect())
    }

    fn soft_delete_submission(&self, kind: SubmissionKind, id: Uuid) -> StoreResult<()> {
        self.set_deleted(kind.collection(), id, true)
    }

    fn restore_submission(&self, kind: SubmissionKind, id: Uuid) -> StoreResult<()> {
        self.set_deleted(kind.collection(), id, false)
    }

    fn purge_submission(&self, kind: SubmissionKind, id: Uuid) -> StoreResult<()> {
        self.purge(kind.collection(), id)
    }
}

fn decode_template(body: &str, deleted: bool) -> Option<SavedTemplate> {
    match serde_json::from_str::<SavedTemplate>(body) {
        Ok(mut template) => {
            // The row flag is authoritative over whatever the body carried.
            template.is_deleted = deleted;
            Some(template)
        }
        Err(err) => {
            warn!("event=record_skipped module=store collection={TEMPLATE_COLLECTION} error={err}");
            None
        }
    }
}

fn decode_submission(kind: SubmissionKind, body: &str, deleted: bool) -> Option<FormSubmission> {
    match serde_json::from_str::<FormSubmission>(body) {
        Ok(mut submission) => {
            submission.is_deleted = deleted;
            Some(submission)
        }
        Err(err) => {
            warn!(
                "event=record_skipped module=store collection={} error={err}",
                kind.collection()
            );
            None
        }
    }
}

fn parse_body_row(row: &Row<'_>) -> StoreResult<(String, bool)> {
    let body: String = row.get(0)?;
    let deleted = row.get::<_, i64>(1)? != 0;
    Ok((body, deleted))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'store_records'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::MissingRequiredTable("store_records"));
    }

    Ok(())
}
