//! Migration runner
//!
//! Applies embedded migrations with checksums and idempotency: an
//! already-applied migration is skipped after its recorded checksum is
//! verified against the embedded SQL.

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error};
use crate::migrations::embedded::get_migrations;
use coffer_core::backend::BackendResult;

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> BackendResult<()> {
    create_schema_version_table(conn)?;

    for migration in get_migrations() {
        apply_migration(conn, migration.id, migration.sql)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> BackendResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn compute_checksum(sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sql.as_bytes());
    hex::encode(hasher.finalize())
}

fn apply_migration(conn: &mut Connection, id: &str, sql: &str) -> BackendResult<()> {
    let checksum = compute_checksum(sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(checksum_mismatch(id, &recorded, &checksum));
        }
        tracing::debug!(migration = id, "migration already applied");
        return Ok(());
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute_batch(sql)
        .map_err(|err| migration_error(id, err))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(migration = id, "migration applied");
    Ok(())
}
