pub mod index;
pub mod seed;
pub mod show;

use std::path::{Path, PathBuf};

use coffer_engine::{open_sqlite_session, EngineConfig, Session};

/// Default database location under the working directory
pub const DEFAULT_DB_PATH: &str = ".coffer/store.db";

/// Open the SQLite-backed session shared by all commands
pub fn open_session(db: &Path, namespace: &str) -> Result<Session, Box<dyn std::error::Error>> {
    if let Some(parent) = db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(open_sqlite_session(db, namespace, EngineConfig::default())?)
}

/// Shared backend options
#[derive(Debug, clap::Args)]
pub struct BackendArgs {
    /// Path to the SQLite database
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Pid namespace for minted identifiers
    #[arg(long, default_value = "coffer")]
    pub namespace: String,
}
