//! Index data types for vault notes, edges, and query results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note document as supplied by the host. The engine never reads files;
/// everything it knows about a note arrives in this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDocument {
    /// Canonical path relative to the vault root. Stable identifier until
    /// the note is renamed (a rename is remove-old + upsert-new).
    pub path: String,
    /// Note title.
    pub title: String,
    /// File modification time.
    pub mtime: DateTime<Utc>,
    /// File size in bytes.
    pub size: u64,
    /// Markdown body.
    pub body: String,
}

/// Stored note metadata, as returned by queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Canonical path relative to the vault root (unique within a vault).
    pub path: String,
    /// Note title.
    pub title: String,
    /// File modification time.
    pub mtime: DateTime<Utc>,
    /// File size in bytes.
    pub size: u64,
}

impl NoteRecord {
    pub fn from_document(doc: &NoteDocument) -> Self {
        Self {
            path: doc.path.clone(),
            title: doc.title.clone(),
            mtime: doc.mtime,
            size: doc.size,
        }
    }
}

/// A resolved outlink edge. Backlinks are the transpose, computed at query
/// time by filtering on the target column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdge {
    pub source_path: String,
    pub target_path: String,
}

/// Which columns a search query matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// Title column only.
    Title,
    /// Title and body.
    #[default]
    Full,
}

/// A ranked full-text search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub note: NoteRecord,
    /// Relevance score (higher = more relevant, deterministic for a fixed
    /// document set).
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A typeahead suggestion hit. No snippet; the last query term is treated
/// as a prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestHit {
    pub note: NoteRecord,
    pub score: f64,
}

/// Per-vault indexing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VaultState {
    /// Store open, nothing indexed yet.
    #[default]
    Uninitialized,
    /// A full rebuild is in flight.
    Rebuilding,
    /// Incremental operations and queries allowed.
    Ready,
}

/// Statistics from a full rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebuildStats {
    /// Number of notes indexed.
    pub notes: usize,
    /// Number of outlink edges written.
    pub edges: usize,
    /// Rebuild duration in milliseconds.
    pub duration_ms: u64,
}
