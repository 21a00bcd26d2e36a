//! Vault walking: turning markdown files on disk into engine documents.
//! The engine itself never reads files; this is the host's half of the
//! contract.

use std::path::Path;
use std::{fs, io};

use chrono::{DateTime, Utc};
use notedex_core::index::NoteDocument;
use walkdir::WalkDir;

/// Collect all markdown files under the vault root as engine documents,
/// sorted by path. Hidden directories and common non-vault directories are
/// skipped.
pub fn collect_documents(root: &Path) -> io::Result<Vec<NoteDocument>> {
    let root = root.canonicalize()?;
    let mut documents = Vec::new();

    for entry in WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
    {
        let entry = entry.map_err(io::Error::other)?;
        let path = entry.path();
        if !path.is_file() || !is_markdown_file(path) {
            continue;
        }

        let metadata = path.metadata()?;
        let body = fs::read_to_string(path)?;

        let relative = path.strip_prefix(&root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        documents.push(NoteDocument {
            title: extract_title(&body, relative),
            path: rel_str,
            mtime: DateTime::<Utc>::from(
                metadata.modified().unwrap_or(std::time::UNIX_EPOCH),
            ),
            size: metadata.len(),
            body,
        });
    }

    documents.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(documents)
}

fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    // Never filter the root directory (depth 0)
    if entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();

    if name.starts_with('.') {
        return true;
    }

    matches!(name.as_ref(), "node_modules" | "target" | "__pycache__" | "venv")
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "md")
}

/// Title: first markdown heading, else the filename stem.
fn extract_title(body: &str, path: &Path) -> String {
    for line in body.lines() {
        let trimmed = line.trim();
        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    path.file_stem().and_then(|s| s.to_str()).unwrap_or("Untitled").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_skips_hidden_and_non_markdown() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("note1.md"), "# Note 1").unwrap();
        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/note2.md"), "# Note 2").unwrap();
        fs::create_dir(root.join(".hidden")).unwrap();
        fs::write(root.join(".hidden/secret.md"), "# Secret").unwrap();
        fs::write(root.join("readme.txt"), "not markdown").unwrap();

        let docs = collect_documents(root).unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();

        assert_eq!(paths, vec!["note1.md", "subdir/note2.md"]);
    }

    #[test]
    fn test_title_from_heading() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "intro text\n\n## The Real Title\n").unwrap();

        let docs = collect_documents(dir.path()).unwrap();
        assert_eq!(docs[0].title, "The Real Title");
    }

    #[test]
    fn test_title_falls_back_to_stem() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("my-note.md"), "no heading here").unwrap();

        let docs = collect_documents(dir.path()).unwrap();
        assert_eq!(docs[0].title, "my-note");
    }
}
