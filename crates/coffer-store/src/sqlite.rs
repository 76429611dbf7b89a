//! SQLite backend pair
//!
//! One database file holds the object store tables and the index
//! documents; [`open_sqlite`] opens it, applies migrations, and hands
//! back both halves sharing the connection. The connection sits behind
//! a mutex so the contract's `&self` methods work; calls are strictly
//! sequential, matching the engine's synchronous model.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use crate::errors::{corrupt, from_rusqlite};
use crate::migrations::apply_migrations;
use coffer_core::backend::{
    BackendError, BackendResult, DatastreamProfile, IndexDocument, ObjectProfile, ObjectStore,
    RelationshipAssertion, SearchIndex,
};
use coffer_core::model::{DigitalObject, ObjectState, Predicate};
use coffer_core_types::schema::{predicate_from_rel_field, INDEX_SCHEMA_VERSION};
use coffer_core_types::Pid;

/// SQLite-backed object store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    namespace: String,
}

/// SQLite-backed search index
pub struct SqliteIndex {
    conn: Arc<Mutex<Connection>>,
}

/// Open (or create) a database, apply migrations, and return the
/// store/index pair sharing its connection.
pub fn open_sqlite(
    path: &Path,
    namespace: impl Into<String>,
) -> BackendResult<(SqliteStore, SqliteIndex)> {
    let mut conn = Connection::open(path).map_err(from_rusqlite)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(from_rusqlite)?;
    apply_migrations(&mut conn)?;

    let conn = Arc::new(Mutex::new(conn));
    Ok((
        SqliteStore {
            conn: Arc::clone(&conn),
            namespace: namespace.into(),
        },
        SqliteIndex { conn },
    ))
}

fn timestamp_to_date(value: Option<i64>) -> Option<DateTime<Utc>> {
    value.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

impl ObjectStore for SqliteStore {
    fn mint_pid(&self) -> BackendResult<Pid> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO pid_sequence (namespace, counter) VALUES (?1, 1)
             ON CONFLICT(namespace) DO UPDATE SET counter = counter + 1",
            rusqlite::params![self.namespace],
        )
        .map_err(from_rusqlite)?;
        let counter: i64 = conn
            .query_row(
                "SELECT counter FROM pid_sequence WHERE namespace = ?1",
                rusqlite::params![self.namespace],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;

        let raw = format!("{}:{}", self.namespace, counter);
        Pid::parse(&raw).map_err(|err| BackendError::Message(err.to_string()))
    }

    fn fetch_object(&self, pid: &Pid) -> BackendResult<Option<ObjectProfile>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT label, state, owner_id, create_date, modified_date
             FROM objects WHERE pid = ?1",
            rusqlite::params![pid.as_str()],
            |row| {
                Ok(ObjectProfile {
                    pid: pid.clone(),
                    label: row.get(0)?,
                    state: ObjectState::from_code(&row.get::<_, String>(1)?),
                    owner_id: row.get(2)?,
                    create_date: timestamp_to_date(row.get(3)?),
                    modified_date: timestamp_to_date(row.get(4)?),
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)
    }

    fn fetch_datastream_manifest(&self, pid: &Pid) -> BackendResult<Vec<DatastreamProfile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT dsid, label, mime_type, control_group, size, checksum
                 FROM datastreams WHERE pid = ?1 ORDER BY rowid",
            )
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(rusqlite::params![pid.as_str()], |row| {
                Ok(DatastreamProfile {
                    dsid: row.get(0)?,
                    label: row.get(1)?,
                    mime_type: row.get(2)?,
                    control_group: row.get(3)?,
                    size: row.get::<_, Option<i64>>(4)?.map(|s| s as u64),
                    checksum: row.get(5)?,
                })
            })
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn fetch_datastream_content(&self, pid: &Pid, dsid: &str) -> BackendResult<Option<Vec<u8>>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT content FROM datastreams WHERE pid = ?1 AND dsid = ?2",
            rusqlite::params![pid.as_str(), dsid],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    fn save_object(&self, object: &DigitalObject) -> BackendResult<ObjectProfile> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let existing_create: Option<i64> = conn
            .query_row(
                "SELECT create_date FROM objects WHERE pid = ?1",
                rusqlite::params![object.pid().as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?
            .flatten();
        let create_date = existing_create.unwrap_or_else(|| now.timestamp());

        conn.execute(
            "INSERT INTO objects (pid, label, state, owner_id, create_date, modified_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(pid) DO UPDATE SET
                label = excluded.label,
                state = excluded.state,
                owner_id = excluded.owner_id,
                modified_date = excluded.modified_date",
            rusqlite::params![
                object.pid().as_str(),
                object.label,
                object.state.code(),
                object.owner_id,
                create_date,
                now.timestamp(),
            ],
        )
        .map_err(from_rusqlite)?;

        Ok(ObjectProfile {
            pid: object.pid().clone(),
            label: object.label.clone(),
            state: object.state,
            owner_id: object.owner_id.clone(),
            create_date: timestamp_to_date(Some(create_date)),
            modified_date: timestamp_to_date(Some(now.timestamp())),
        })
    }

    fn save_datastream(
        &self,
        pid: &Pid,
        profile: &DatastreamProfile,
        content: &[u8],
    ) -> BackendResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO datastreams (pid, dsid, label, mime_type, control_group, size, checksum, content)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(pid, dsid) DO UPDATE SET
                label = excluded.label,
                mime_type = excluded.mime_type,
                control_group = excluded.control_group,
                size = excluded.size,
                checksum = excluded.checksum,
                content = excluded.content",
            rusqlite::params![
                pid.as_str(),
                profile.dsid,
                profile.label,
                profile.mime_type,
                profile.control_group,
                profile.size.map(|s| s as i64),
                profile.checksum,
                content,
            ],
        )
        .map_err(|err| match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                BackendError::NotFound(pid.to_string())
            }
            other => from_rusqlite(other),
        })?;
        Ok(())
    }

    fn delete_object(&self, pid: &Pid) -> BackendResult<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute(
                "DELETE FROM objects WHERE pid = ?1",
                rusqlite::params![pid.as_str()],
            )
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }
}

impl SqliteIndex {
    fn all_documents(&self) -> BackendResult<Vec<IndexDocument>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT document FROM index_documents")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.iter()
            .map(|raw| serde_json::from_str(raw).map_err(|err| corrupt("index document", err)))
            .collect()
    }
}

impl SearchIndex for SqliteIndex {
    fn query(&self, pid: &Pid) -> BackendResult<Option<IndexDocument>> {
        let conn = self.conn.lock().unwrap();
        let raw: Option<String> = conn
            .query_row(
                "SELECT document FROM index_documents WHERE pid = ?1",
                rusqlite::params![pid.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(from_rusqlite)?;
        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|err| corrupt("index document", err)),
            None => Ok(None),
        }
    }

    fn update(&self, document: &IndexDocument) -> BackendResult<()> {
        let id = document
            .id()
            .ok_or_else(|| BackendError::Message("index document without id".to_string()))?;
        let raw = serde_json::to_string(document).map_err(|err| corrupt("index document", err))?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO index_documents (pid, schema_version, document)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(pid) DO UPDATE SET
                schema_version = excluded.schema_version,
                document = excluded.document",
            rusqlite::params![id, INDEX_SCHEMA_VERSION, raw],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    fn delete(&self, pid: &Pid) -> BackendResult<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute(
                "DELETE FROM index_documents WHERE pid = ?1",
                rusqlite::params![pid.as_str()],
            )
            .map_err(from_rusqlite)?;
        Ok(removed > 0)
    }

    fn query_relationships_to(
        &self,
        target_uri: &str,
    ) -> BackendResult<Vec<RelationshipAssertion>> {
        let mut assertions = Vec::new();
        for doc in self.all_documents()? {
            let Some(id) = doc.id() else { continue };
            let Ok(source) = Pid::parse(id) else { continue };
            for (field, values) in doc.relationship_fields() {
                if !values.iter().any(|v| v == target_uri) {
                    continue;
                }
                if let Some(predicate) = predicate_from_rel_field(field) {
                    assertions.push(RelationshipAssertion {
                        source: source.clone(),
                        predicate: Predicate::from(predicate),
                    });
                }
            }
        }
        Ok(assertions)
    }
}
