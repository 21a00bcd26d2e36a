//! Ranked full-text search and prefix suggestion over one vault's store.
//!
//! Matching is delegated to FTS5: terms are quoted and joined with AND,
//! ranking is BM25 with the title column weighted above the body. Both
//! entry points are read-only and safe to call while indexing for the same
//! vault is in flight; they observe whatever committed batches exist.

use rusqlite::params;

use super::db::{IndexStore, StoreError};
use super::types::{NoteRecord, SearchHit, SearchScope, SuggestHit};

/// Result cap substituted when a search request carries no usable limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
/// Result cap substituted when a suggest request carries no usable limit.
pub const DEFAULT_SUGGEST_LIMIT: usize = 15;

// BM25 column weights: (path, title, body). Path is unindexed.
const SEARCH_WEIGHTS: (f64, f64, f64) = (0.0, 5.0, 1.0);
const SUGGEST_WEIGHTS: (f64, f64, f64) = (0.0, 10.0, 1.0);

/// Query engine over one vault's store.
pub struct SearchEngine<'a> {
    store: &'a IndexStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a IndexStore) -> Self {
        Self { store }
    }

    /// Ranked full-text search. All terms must match (AND semantics),
    /// scoped to title-only or title+body. An empty or whitespace query
    /// returns no hits without touching storage.
    pub fn search(
        &self,
        text: &str,
        scope: SearchScope,
        limit: Option<f64>,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let terms = tokenize(text);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let expr = build_match_expr(&terms, scope, false);
        let limit = coerce_limit(limit, DEFAULT_SEARCH_LIMIT);
        let (wp, wt, wb) = SEARCH_WEIGHTS;

        let sql = format!(
            "SELECT n.path, n.title, n.modified_at, n.size,
                    -bm25(note_fts, {wp}, {wt}, {wb}) AS score,
                    snippet(note_fts, -1, '', '', '…', 12) AS snip
             FROM note_fts
             JOIN notes n ON n.path = note_fts.path
             WHERE note_fts MATCH ?1
             ORDER BY score DESC, n.path
             LIMIT ?2"
        );

        let mut stmt = self.store.connection().prepare(&sql)?;
        let hits = stmt
            .query_map(params![expr, limit as i64], |row| {
                Ok(SearchHit {
                    note: row_to_note(row)?,
                    score: row.get(4)?,
                    snippet: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    /// Typeahead suggestion: same tokenization with the last term treated
    /// as a prefix, title weighted more heavily, no snippets.
    pub fn suggest(
        &self,
        text: &str,
        limit: Option<f64>,
    ) -> Result<Vec<SuggestHit>, StoreError> {
        let terms = tokenize(text);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let expr = build_match_expr(&terms, SearchScope::Full, true);
        let limit = coerce_limit(limit, DEFAULT_SUGGEST_LIMIT);
        let (wp, wt, wb) = SUGGEST_WEIGHTS;

        let sql = format!(
            "SELECT n.path, n.title, n.modified_at, n.size,
                    -bm25(note_fts, {wp}, {wt}, {wb}) AS score
             FROM note_fts
             JOIN notes n ON n.path = note_fts.path
             WHERE note_fts MATCH ?1
             ORDER BY score DESC, n.path
             LIMIT ?2"
        );

        let mut stmt = self.store.connection().prepare(&sql)?;
        let hits = stmt
            .query_map(params![expr, limit as i64], |row| {
                Ok(SuggestHit { note: row_to_note(row)?, score: row.get(4)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }
}

/// Decode the shared note columns of a hit row.
fn row_to_note(row: &rusqlite::Row) -> Result<NoteRecord, rusqlite::Error> {
    let modified_str: String = row.get(2)?;
    let size: i64 = row.get(3)?;

    Ok(NoteRecord {
        path: row.get(0)?,
        title: row.get(1)?,
        mtime: chrono::DateTime::parse_from_rfc3339(&modified_str)
            .map(|d| d.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now()),
        size: size.max(0) as u64,
    })
}

/// Split a query into terms, dropping characters that would escape FTS5
/// string syntax.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.replace('"', ""))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Build an FTS5 match expression: quoted terms joined with AND, optionally
/// column-filtered to the title and with the last term as a prefix.
fn build_match_expr(terms: &[String], scope: SearchScope, prefix_last: bool) -> String {
    let last = terms.len() - 1;

    terms
        .iter()
        .enumerate()
        .map(|(i, term)| {
            let mut phrase = format!("\"{term}\"");
            if prefix_last && i == last {
                phrase.push('*');
            }
            match scope {
                SearchScope::Title => format!("title : {phrase}"),
                SearchScope::Full => phrase,
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Coerce a host-supplied limit to a positive integer, substituting the
/// default for missing, non-finite, or non-positive input.
fn coerce_limit(limit: Option<f64>, default: usize) -> usize {
    match limit {
        Some(l) if l.is_finite() && l >= 1.0 => l.floor() as usize,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::NoteDocument;
    use chrono::Utc;

    fn doc(path: &str, title: &str, body: &str) -> NoteDocument {
        NoteDocument {
            path: path.to_string(),
            title: title.to_string(),
            mtime: Utc::now(),
            size: body.len() as u64,
            body: body.to_string(),
        }
    }

    fn seeded_store() -> IndexStore {
        let store = IndexStore::open_in_memory().unwrap();
        store
            .index_batch(&[
                doc("docs/alpha.md", "Alpha Notes", "the quick brown fox"),
                doc("docs/beta.md", "Beta Journal", "a lazy dog sleeps"),
                doc("docs/gamma.md", "Gamma", "quick dog tricks"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        assert!(engine.search("", SearchScope::Full, None).unwrap().is_empty());
        assert!(engine.search("   ", SearchScope::Full, None).unwrap().is_empty());
        assert!(engine.suggest("", None).unwrap().is_empty());
    }

    #[test]
    fn test_single_term_body_match() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        let hits = engine.search("fox", SearchScope::Full, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note.path, "docs/alpha.md");
        assert!(hits[0].score > 0.0);
        assert!(hits[0].snippet.is_some());
    }

    #[test]
    fn test_all_terms_required() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        // "quick" matches alpha and gamma; "dog" narrows to gamma only
        let hits = engine.search("quick dog", SearchScope::Full, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note.path, "docs/gamma.md");
    }

    #[test]
    fn test_title_scope_ignores_body() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        let hits = engine.search("dog", SearchScope::Title, None).unwrap();
        assert!(hits.is_empty());

        let hits = engine.search("journal", SearchScope::Title, None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note.path, "docs/beta.md");
    }

    #[test]
    fn test_title_match_outranks_body_match() {
        let store = IndexStore::open_in_memory().unwrap();
        store
            .index_batch(&[
                doc("in-title.md", "kernel design", "misc text"),
                doc("in-body.md", "misc", "kernel mentioned in passing"),
            ])
            .unwrap();
        let engine = SearchEngine::new(&store);

        let hits = engine.search("kernel", SearchScope::Full, None).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].note.path, "in-title.md");
    }

    #[test]
    fn test_suggest_last_term_prefix() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        let hits = engine.suggest("al", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note.path, "docs/alpha.md");
    }

    #[test]
    fn test_negative_limit_falls_back_to_default() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        // Behaves as if the default limit were passed, not as "no results"
        let hits = engine.search("quick", SearchScope::Full, Some(-5.0)).unwrap();
        assert_eq!(hits.len(), 2);

        let hits = engine.search("quick", SearchScope::Full, Some(f64::NAN)).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_limit_truncates() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        let hits = engine.search("quick", SearchScope::Full, Some(1.0)).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_quotes_in_query_are_neutralized() {
        let store = seeded_store();
        let engine = SearchEngine::new(&store);

        // Must not produce an FTS5 syntax error
        let hits = engine.search("\"fox\"", SearchScope::Full, None).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_coerce_limit() {
        assert_eq!(coerce_limit(None, 50), 50);
        assert_eq!(coerce_limit(Some(0.0), 50), 50);
        assert_eq!(coerce_limit(Some(-1.0), 50), 50);
        assert_eq!(coerce_limit(Some(f64::INFINITY), 50), 50);
        assert_eq!(coerce_limit(Some(10.0), 50), 10);
        assert_eq!(coerce_limit(Some(2.7), 50), 2);
    }
}
