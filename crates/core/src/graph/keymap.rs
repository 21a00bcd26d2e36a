//! Resolution of link tokens to canonical note paths.

use std::collections::{BTreeSet, HashMap};

use crate::index::NoteRecord;

/// Normalize a path or token for lookup: separators unified, section
/// fragment dropped, case folded, `.md` extension stripped.
pub fn normalize_key(raw: &str) -> String {
    let mut s = raw.trim().replace('\\', "/");

    if let Some(idx) = s.find('#') {
        s.truncate(idx);
    }

    let mut s = s.trim().trim_start_matches("./").to_lowercase();

    if let Some(stripped) = s.strip_suffix(".md") {
        s = stripped.to_string();
    }

    s.trim_matches('/').to_string()
}

/// Ephemeral lookup structure built from a snapshot of the note set.
/// Each note contributes two keys: its full relative path without extension
/// and its bare filename stem. Both may be shared by several notes.
pub struct KeyMap {
    by_path: HashMap<String, Vec<String>>,
    by_stem: HashMap<String, Vec<String>>,
}

impl KeyMap {
    pub fn build(notes: &[NoteRecord]) -> Self {
        Self::from_paths(notes.iter().map(|n| n.path.as_str()))
    }

    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut by_path: HashMap<String, Vec<String>> = HashMap::new();
        let mut by_stem: HashMap<String, Vec<String>> = HashMap::new();

        for path in paths {
            let full = normalize_key(path);
            if full.is_empty() {
                continue;
            }

            let stem = full.rsplit('/').next().unwrap_or(&full).to_string();

            by_path.entry(full).or_default().push(path.to_string());
            by_stem.entry(stem).or_default().push(path.to_string());
        }

        Self { by_path, by_stem }
    }

    /// Resolve a raw token to at most one canonical path.
    ///
    /// A full-path key with exactly one candidate wins; otherwise a stem key
    /// with exactly one candidate. A matching key with several candidates is
    /// ambiguous and resolves to nothing.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        let key = normalize_key(token);
        if key.is_empty() {
            return None;
        }

        if let Some(candidates) = self.by_path.get(&key) {
            return match candidates.as_slice() {
                [single] => Some(single.as_str()),
                _ => None,
            };
        }

        match self.by_stem.get(&key).map(Vec::as_slice) {
            Some([single]) => Some(single.as_str()),
            _ => None,
        }
    }

    /// Resolve all tokens for one source note. Unresolved and ambiguous
    /// tokens yield nothing; self-references are dropped; the result is
    /// deduplicated and sorted.
    pub fn resolve_targets(&self, source_path: &str, tokens: &[String]) -> Vec<String> {
        let mut targets = BTreeSet::new();

        for token in tokens {
            if let Some(target) = self.resolve(token)
                && target != source_path
            {
                targets.insert(target.to_string());
            }
        }

        targets.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Docs/Alpha.md", "docs/alpha")]
    #[case("docs\\alpha.md", "docs/alpha")]
    #[case("./docs/alpha.md", "docs/alpha")]
    #[case("  alpha  ", "alpha")]
    #[case("note#section", "note")]
    #[case("Note.MD", "note")]
    #[case("nested/dir/Note", "nested/dir/note")]
    fn test_normalize_key(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_key(raw), expected);
    }

    #[test]
    fn test_resolve_by_stem() {
        let map = KeyMap::from_paths(["docs/alpha.md", "docs/beta.md"]);

        assert_eq!(map.resolve("alpha"), Some("docs/alpha.md"));
        assert_eq!(map.resolve("Beta"), Some("docs/beta.md"));
        assert_eq!(map.resolve("gamma"), None);
    }

    #[test]
    fn test_resolve_full_path_wins_over_stem() {
        // "alpha" is both a full-path key (alpha.md) and a stem shared with
        // docs/alpha.md; the full-path match must win.
        let map = KeyMap::from_paths(["alpha.md", "docs/alpha.md"]);

        assert_eq!(map.resolve("alpha"), Some("alpha.md"));
        assert_eq!(map.resolve("docs/alpha"), Some("docs/alpha.md"));
    }

    #[test]
    fn test_ambiguous_stem_resolves_to_nothing() {
        let map = KeyMap::from_paths(["docs/x.md", "notes/x.md"]);

        assert_eq!(map.resolve("x"), None);
        // Full paths stay unambiguous
        assert_eq!(map.resolve("docs/x"), Some("docs/x.md"));
        assert_eq!(map.resolve("notes/x"), Some("notes/x.md"));
    }

    #[test]
    fn test_ambiguous_full_path_key() {
        // Case-folding can collide distinct paths; that is ambiguity too
        let map = KeyMap::from_paths(["A/B.md", "a/b.md"]);
        assert_eq!(map.resolve("a/b"), None);
    }

    #[test]
    fn test_resolve_targets_drops_self_and_dedupes() {
        let map = KeyMap::from_paths(["docs/alpha.md", "docs/beta.md"]);

        let tokens = vec![
            "beta".to_string(),
            "beta".to_string(),
            "alpha".to_string(), // self
            "missing".to_string(),
        ];
        let targets = map.resolve_targets("docs/alpha.md", &tokens);

        assert_eq!(targets, vec!["docs/beta.md"]);
    }

    #[test]
    fn test_empty_token() {
        let map = KeyMap::from_paths(["docs/alpha.md"]);
        assert_eq!(map.resolve(""), None);
        assert_eq!(map.resolve("   "), None);
    }
}
