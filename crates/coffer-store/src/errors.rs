//! Error helpers for coffer-store
//!
//! Store failures surface as `coffer_core::backend::BackendError` so
//! the engine sees one taxonomy regardless of backend.

use coffer_core::backend::BackendError;

/// Map a rusqlite error onto the backend taxonomy
pub fn from_rusqlite(err: rusqlite::Error) -> BackendError {
    BackendError::Io(err.to_string())
}

/// A stored record failed to decode
pub fn corrupt(what: &str, reason: impl std::fmt::Display) -> BackendError {
    BackendError::Corrupt(format!("{what}: {reason}"))
}

/// Migration failure
pub fn migration_error(migration_id: &str, reason: impl std::fmt::Display) -> BackendError {
    BackendError::Message(format!("migration {migration_id} failed: {reason}"))
}

/// Migration checksum mismatch
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> BackendError {
    BackendError::Corrupt(format!(
        "checksum mismatch for migration {migration_id}: expected {expected}, got {actual}"
    ))
}
