//! SQLite schema definition and migrations.

use rusqlite::Connection;
use thiserror::Error;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema version {found} is newer than supported {supported}")]
    VersionTooNew { found: i32, supported: i32 },

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Initialize or migrate the database schema. Idempotent: a store already at
/// the current version passes through untouched.
pub fn ensure_schema(conn: &Connection) -> Result<(), SchemaError> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version < SCHEMA_VERSION {
        migrate(conn, version)?;
    } else if version > SCHEMA_VERSION {
        return Err(SchemaError::VersionTooNew {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
        [version],
    )?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- Notes: metadata for each indexed note, keyed by canonical path
        CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            modified_at TEXT NOT NULL,
            size INTEGER NOT NULL
        );

        CREATE INDEX idx_notes_modified ON notes(modified_at);

        -- Outlink edges. Backlinks are the transpose (filter on target_path)
        CREATE TABLE links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_path TEXT NOT NULL,
            target_path TEXT NOT NULL
        );

        CREATE INDEX idx_links_source ON links(source_path);
        CREATE INDEX idx_links_target ON links(target_path);

        -- Full-text documents: title + body per note, replaced wholesale
        CREATE VIRTUAL TABLE IF NOT EXISTS note_fts USING fts5(
            path UNINDEXED,
            title,
            body,
            tokenize = 'unicode61 remove_diacritics 2'
        );
        "#,
    )?;

    Ok(())
}

fn migrate(_conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    // No migrations exist yet - we only have v1
    Err(SchemaError::MigrationFailed(format!(
        "No migration path from version {} to {}",
        from_version, SCHEMA_VERSION
    )))
}
