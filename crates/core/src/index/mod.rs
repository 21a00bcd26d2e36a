//! Per-vault index: storage backend selection, the SQLite store, indexing
//! operations, and the query engine.
//!
//! Three record sets are kept per vault:
//! - note metadata (path, title, mtime, size)
//! - full-text documents (title + body, FTS5, replaced wholesale)
//! - outlink edges (backlinks are the transpose, computed at query time)
//!
//! # Example
//!
//! ```no_run
//! use notedex_core::index::{IndexStore, SearchEngine, SearchScope};
//!
//! let store = IndexStore::open_in_memory().unwrap();
//! let engine = SearchEngine::new(&store);
//! let hits = engine.search("alpha", SearchScope::Full, None).unwrap();
//! ```

pub mod backend;
pub mod db;
pub mod ops;
pub mod registry;
pub mod schema;
pub mod search;
pub mod types;

pub use backend::{Backend, BackendCandidate, BackendError, default_candidates, select_backend};
pub use db::{ExecOutcome, IndexStore, StoreError};
pub use ops::{Indexer, OpsError};
pub use registry::{StoreRegistry, VaultEntry};
pub use schema::{SCHEMA_VERSION, SchemaError};
pub use search::{DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGEST_LIMIT, SearchEngine};
pub use types::{
    LinkEdge, NoteDocument, NoteRecord, RebuildStats, SearchHit, SearchScope,
    SuggestHit, VaultState,
};
