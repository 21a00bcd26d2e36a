//! Storage backend negotiation with fallback.
//!
//! Candidates are tried in priority order (most durable first, in-memory
//! last). Each candidate is a plain `try_open` function, so fallback order
//! is unit-testable without touching real storage.

use std::fs;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to create data directory {0}: {1}")]
    DataDir(String, #[source] std::io::Error),

    #[error("probe readback mismatch on backend '{0}'")]
    ProbeMismatch(&'static str),

    #[error("no backend candidates supplied")]
    NoCandidates,

    #[error("no viable storage backend; last candidate '{name}' failed: {source}")]
    Exhausted {
        name: &'static str,
        #[source]
        source: Box<BackendError>,
    },
}

/// An adopted storage backend. Selected once per engine instance.
#[derive(Debug, Clone)]
pub enum Backend {
    /// One SQLite database file per vault under `dir`.
    File { dir: PathBuf },
    /// In-memory SQLite, one connection per vault. Lives only as long as
    /// the engine keeps the connection open.
    Memory,
}

impl Backend {
    /// Identity reported to the host in the per-vault `ready` event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::File { .. } => "sqlite-file",
            Self::Memory => "sqlite-memory",
        }
    }

    /// Open a raw connection for the given vault. Schema setup happens in
    /// the store layer, not here.
    pub fn open_vault(&self, vault_id: &str) -> Result<Connection, BackendError> {
        match self {
            Self::File { dir } => {
                let path = dir.join(vault_db_name(vault_id));
                Ok(Connection::open(path)?)
            }
            Self::Memory => Ok(Connection::open_in_memory()?),
        }
    }
}

/// A named backend candidate: a pure open-and-verify function.
pub struct BackendCandidate {
    name: &'static str,
    open: Box<dyn Fn() -> Result<Backend, BackendError> + Send>,
}

impl BackendCandidate {
    pub fn new(
        name: &'static str,
        open: impl Fn() -> Result<Backend, BackendError> + Send + 'static,
    ) -> Self {
        Self { name, open: Box::new(open) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn try_open(&self) -> Result<Backend, BackendError> {
        (self.open)()
    }
}

/// The production candidate list: file-backed SQLite, then in-memory.
pub fn default_candidates(data_dir: PathBuf) -> Vec<BackendCandidate> {
    vec![
        BackendCandidate::new("sqlite-file", move || open_file_backend(data_dir.clone())),
        BackendCandidate::new("sqlite-memory", open_memory_backend),
    ]
}

/// Walk the candidate list in order and adopt the first that opens and
/// passes its probe. Failures of non-terminal candidates are logged and
/// swallowed; failure of the terminal candidate is fatal.
pub fn select_backend(candidates: &[BackendCandidate]) -> Result<Backend, BackendError> {
    let Some((terminal, rest)) = candidates.split_last() else {
        return Err(BackendError::NoCandidates);
    };

    for candidate in rest {
        match candidate.try_open() {
            Ok(backend) => {
                tracing::info!("selected storage backend '{}'", backend.name());
                return Ok(backend);
            }
            Err(e) => {
                tracing::warn!("backend '{}' unavailable: {}", candidate.name(), e);
            }
        }
    }

    match terminal.try_open() {
        Ok(backend) => {
            tracing::info!("selected storage backend '{}'", backend.name());
            Ok(backend)
        }
        Err(e) => Err(BackendError::Exhausted {
            name: terminal.name(),
            source: Box::new(e),
        }),
    }
}

fn open_file_backend(dir: PathBuf) -> Result<Backend, BackendError> {
    fs::create_dir_all(&dir)
        .map_err(|e| BackendError::DataDir(dir.display().to_string(), e))?;

    let probe_path = dir.join("probe.db");
    let conn = Connection::open(&probe_path)?;
    probe(&conn, "sqlite-file")?;
    drop(conn);
    let _ = fs::remove_file(&probe_path);

    Ok(Backend::File { dir })
}

fn open_memory_backend() -> Result<Backend, BackendError> {
    let conn = Connection::open_in_memory()?;
    probe(&conn, "sqlite-memory")?;
    Ok(Backend::Memory)
}

/// Trivial write/read round trip proving the connection is usable.
fn probe(conn: &Connection, name: &'static str) -> Result<(), BackendError> {
    conn.execute_batch(
        "CREATE TABLE _probe (v INTEGER);
         INSERT INTO _probe (v) VALUES (42);",
    )?;
    let v: i64 = conn.query_row("SELECT v FROM _probe", [], |row| row.get(0))?;
    conn.execute_batch("DROP TABLE _probe;")?;

    if v != 42 {
        return Err(BackendError::ProbeMismatch(name));
    }
    Ok(())
}

/// Map an opaque vault id to a database filename: a readable sanitized stem
/// plus a stable hash suffix so distinct ids never collide.
fn vault_db_name(vault_id: &str) -> String {
    let mut stem: String = vault_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    stem.truncate(32);
    if stem.is_empty() {
        stem.push_str("vault");
    }

    let mut hasher = DefaultHasher::new();
    vault_id.hash(&mut hasher);

    format!("{}-{:016x}.db", stem, hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_candidate_opens() {
        let backend = open_memory_backend().unwrap();
        assert_eq!(backend.name(), "sqlite-memory");
    }

    #[test]
    fn test_file_candidate_creates_dir_and_cleans_probe() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("nested/data");

        let backend = open_file_backend(data_dir.clone()).unwrap();
        assert_eq!(backend.name(), "sqlite-file");
        assert!(data_dir.exists());
        assert!(!data_dir.join("probe.db").exists());

        // Vault connections open under the data dir
        let conn = backend.open_vault("my-vault").unwrap();
        conn.execute_batch("CREATE TABLE t (x);").unwrap();
    }

    #[test]
    fn test_select_adopts_first_success() {
        let candidates = vec![
            BackendCandidate::new("a", || Ok(Backend::Memory)),
            BackendCandidate::new("b", || panic!("should not be tried")),
        ];
        let backend = select_backend(&candidates).unwrap();
        assert_eq!(backend.name(), "sqlite-memory");
    }

    #[test]
    fn test_select_falls_through_failures() {
        let candidates = vec![
            BackendCandidate::new("broken", || Err(BackendError::ProbeMismatch("broken"))),
            BackendCandidate::new("fallback", || Ok(Backend::Memory)),
        ];
        let backend = select_backend(&candidates).unwrap();
        assert_eq!(backend.name(), "sqlite-memory");
    }

    #[test]
    fn test_select_terminal_failure_is_fatal() {
        let candidates = vec![
            BackendCandidate::new("broken", || Err(BackendError::ProbeMismatch("broken"))),
            BackendCandidate::new("also-broken", || {
                Err(BackendError::ProbeMismatch("also-broken"))
            }),
        ];
        let err = select_backend(&candidates).unwrap_err();
        match err {
            BackendError::Exhausted { name, .. } => assert_eq!(name, "also-broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_empty_list() {
        let err = select_backend(&[]).unwrap_err();
        assert!(matches!(err, BackendError::NoCandidates));
    }

    #[test]
    fn test_vault_db_name_stable_and_distinct() {
        let a1 = vault_db_name("/home/user/vault a");
        let a2 = vault_db_name("/home/user/vault a");
        let b = vault_db_name("/home/user/vault b");

        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert!(a1.ends_with(".db"));
        // Sanitized stem keeps no path separators
        assert!(!a1.contains('/'));
    }
}
