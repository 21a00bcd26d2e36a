//! Per-vault store: connection handling and typed row primitives.

use chrono::Utc;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::backend::{Backend, BackendError};
use super::schema::{SchemaError, ensure_schema};
use super::types::{LinkEdge, NoteDocument, NoteRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Outcome of a diagnostic statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecOutcome {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
    pub changes: usize,
}

/// One vault's index store. Wraps a single connection; all access goes
/// through typed primitives and the decoders below.
pub struct IndexStore {
    conn: Connection,
}

impl IndexStore {
    /// Open a store for the given vault on the selected backend.
    pub fn open(backend: &Backend, vault_id: &str) -> Result<Self, StoreError> {
        let conn = backend.open_vault(vault_id)?;
        match backend {
            Backend::File { .. } => conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?,
            Backend::Memory => conn.execute_batch("PRAGMA foreign_keys = ON;")?,
        }
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(&Backend::Memory, "test")
    }

    /// Get the underlying connection (used by the query engine).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notes + full-text documents
    // ─────────────────────────────────────────────────────────────────────────

    /// Write one batch of documents in a single transaction: upsert the
    /// note row and replace the full-text row (delete + insert) per
    /// document. Rolls back the whole batch on any failure.
    pub fn index_batch(&self, docs: &[NoteDocument]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        for doc in docs {
            tx.execute(
                "INSERT INTO notes (path, title, modified_at, size)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(path) DO UPDATE SET
                    title = excluded.title,
                    modified_at = excluded.modified_at,
                    size = excluded.size",
                params![doc.path, doc.title, doc.mtime.to_rfc3339(), doc.size as i64],
            )?;

            tx.execute("DELETE FROM note_fts WHERE path = ?1", [&doc.path])?;
            tx.execute(
                "INSERT INTO note_fts (path, title, body) VALUES (?1, ?2, ?3)",
                params![doc.path, doc.title, doc.body],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a note by its path.
    pub fn get_note(&self, path: &str) -> Result<Option<NoteRecord>, StoreError> {
        self.conn
            .query_row(
                "SELECT path, title, modified_at, size FROM notes WHERE path = ?1",
                [path],
                Self::row_to_note,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Snapshot of all note records, ordered by path. Used to build the
    /// key map during link resolution.
    pub fn all_notes(&self) -> Result<Vec<NoteRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, title, modified_at, size FROM notes ORDER BY path")?;

        let notes = stmt
            .query_map([], Self::row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    /// Total note count.
    pub fn count_notes(&self) -> Result<i64, StoreError> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a note's metadata row, full-text row, and the edges it is the
    /// source of, in one transaction. Edges pointing *at* the path stay.
    /// Returns whether a note row existed.
    pub fn remove_note(&self, path: &str) -> Result<bool, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let rows = tx.execute("DELETE FROM notes WHERE path = ?1", [path])?;
        tx.execute("DELETE FROM note_fts WHERE path = ?1", [path])?;
        tx.execute("DELETE FROM links WHERE source_path = ?1", [path])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    /// Clear all three record sets (start of a full rebuild).
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "BEGIN;
             DELETE FROM notes;
             DELETE FROM links;
             DELETE FROM note_fts;
             COMMIT;",
        )?;
        Ok(())
    }

    fn row_to_note(row: &rusqlite::Row) -> Result<NoteRecord, rusqlite::Error> {
        let modified_str: String = row.get(2)?;
        let size: i64 = row.get(3)?;

        Ok(NoteRecord {
            path: row.get(0)?,
            title: row.get(1)?,
            mtime: chrono::DateTime::parse_from_rfc3339(&modified_str)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            size: size.max(0) as u64,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Outlink edges
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the full edge set for one source note in a single
    /// transaction.
    pub fn replace_links(
        &self,
        source_path: &str,
        targets: &[String],
    ) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM links WHERE source_path = ?1", [source_path])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (source_path, target_path) VALUES (?1, ?2)",
            )?;
            for target in targets {
                stmt.execute(params![source_path, target])?;
            }
        }

        tx.commit()?;
        Ok(targets.len())
    }

    /// Bulk-insert edges in one transaction. Used by the rebuild edge pass,
    /// which runs against a freshly cleared links table.
    pub fn insert_edges(&self, edges: &[LinkEdge]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (source_path, target_path) VALUES (?1, ?2)",
            )?;
            for edge in edges {
                stmt.execute(params![edge.source_path, edge.target_path])?;
            }
        }

        tx.commit()?;
        Ok(edges.len())
    }

    /// Targets this note links to.
    pub fn outlinks(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT target_path FROM links WHERE source_path = ?1 ORDER BY target_path",
        )?;
        let targets = stmt
            .query_map([path], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(targets)
    }

    /// Notes linking to this path (the transpose of `outlinks`).
    pub fn backlinks(&self, path: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT source_path FROM links WHERE target_path = ?1 ORDER BY source_path",
        )?;
        let sources = stmt
            .query_map([path], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Diagnostics
    // ─────────────────────────────────────────────────────────────────────────

    /// Run an arbitrary statement with JSON-bound parameters. Queries return
    /// column names + decoded rows; other statements return the affected-row
    /// count.
    pub fn exec(
        &self,
        statement: &str,
        params: &[JsonValue],
    ) -> Result<ExecOutcome, StoreError> {
        let mut stmt = self.conn.prepare(statement)?;
        let bound: Vec<rusqlite::types::Value> =
            params.iter().map(json_to_sql).collect();

        if stmt.column_count() == 0 {
            let changes = stmt.execute(rusqlite::params_from_iter(bound))?;
            return Ok(ExecOutcome { changes, ..ExecOutcome::default() });
        }

        let columns: Vec<String> =
            stmt.column_names().into_iter().map(String::from).collect();

        let mut decoded = Vec::new();
        let mut rows = stmt.query(rusqlite::params_from_iter(bound))?;
        while let Some(row) = rows.next()? {
            let mut out = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                out.push(sql_to_json(row.get_ref(i)?));
            }
            decoded.push(out);
        }

        Ok(ExecOutcome { columns, rows: decoded, changes: 0 })
    }
}

fn json_to_sql(value: &JsonValue) -> rusqlite::types::Value {
    use rusqlite::types::Value;

    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(i64::from(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else {
                Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => {
            serde_json::Number::from_f64(f).map(JsonValue::Number).unwrap_or(JsonValue::Null)
        }
        ValueRef::Text(t) => JsonValue::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => {
            // Hex-encode blobs; this path only serves the diagnostic surface
            JsonValue::String(b.iter().map(|byte| format!("{byte:02x}")).collect())
        }
    }
}
