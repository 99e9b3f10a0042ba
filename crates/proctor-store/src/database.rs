//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/proctor/proctor.db`
    /// - macOS:   `~/Library/Application Support/edu.proctor.proctor/proctor.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\proctor\proctor\data\proctor.db`
    pub fn open_default() -> Result<Self> {
        Self::open_at(&Self::default_path()?)
    }

    /// Path used by [`Database::open_default`]. Creates the parent directory.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("edu", "proctor", "proctor").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("proctor.db"))
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open a private in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // Run schema migrations.
        migrations::run_migrations(&conn)?;

        Ok(Self { conn })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the repository traits, but direct access is
    /// occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().filter(|p| !p.is_empty()).map(PathBuf::from)
    }
}
