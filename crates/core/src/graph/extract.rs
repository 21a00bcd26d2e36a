//! Link token extraction from markdown.

use std::sync::LazyLock;

use regex::Regex;

// Regex patterns for link extraction
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Matches [[target]] or [[target|alias]]
    // Also handles [[target#section]] and [[target#section|alias]]
    Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap()
});

static MARKDOWN_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Matches [text](url) - captures .md files and relative paths
    // Excludes http:// and https:// URLs
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap()
});

/// Extract raw link tokens from a markdown body, in document order.
/// Duplicates are kept; downstream resolution deduplicates.
pub fn extract_link_tokens(markdown: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for line in markdown.lines() {
        for cap in WIKILINK_RE.captures_iter(line) {
            let target = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if !target.is_empty() {
                tokens.push(target.to_string());
            }
        }

        for cap in MARKDOWN_LINK_RE.captures_iter(line) {
            let url = cap.get(2).map(|m| m.as_str()).unwrap_or("");

            // Skip external URLs
            if url.starts_with("http://") || url.starts_with("https://") {
                continue;
            }

            // Skip non-markdown links (images, etc.) unless they look like
            // extensionless note references
            if !url.ends_with(".md") && !is_likely_note_reference(url) {
                continue;
            }

            tokens.push(url.to_string());
        }
    }

    tokens
}

fn is_likely_note_reference(url: &str) -> bool {
    let lower = url.to_lowercase();

    // Skip obvious non-notes
    if lower.ends_with(".png")
        || lower.ends_with(".jpg")
        || lower.ends_with(".jpeg")
        || lower.ends_with(".gif")
        || lower.ends_with(".svg")
        || lower.ends_with(".pdf")
    {
        return false;
    }

    // If no extension, it might be a note reference
    !url.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_wikilinks() {
        let body = r#"# Heading

This links to [[other-note]] and [[another|with alias]].
Also [[path/to/note]] works.
"#;
        let tokens = extract_link_tokens(body);

        assert_eq!(tokens, vec!["other-note", "another", "path/to/note"]);
    }

    #[test]
    fn test_extract_markdown_links() {
        let body = r#"# Note

See [this note](./other.md) for details.
Also [external](https://example.com) should be skipped.
And [image](./pic.png) should be skipped too.
"#;
        let tokens = extract_link_tokens(body);

        assert_eq!(tokens, vec!["./other.md"]);
    }

    #[test]
    fn test_extensionless_reference_kept() {
        let tokens = extract_link_tokens("Read [the intro](guides/intro).");
        assert_eq!(tokens, vec!["guides/intro"]);
    }

    #[test]
    fn test_wikilink_with_section() {
        let tokens = extract_link_tokens("Link to [[note#section]] here.");
        assert_eq!(tokens, vec!["note#section"]);
    }

    #[test]
    fn test_duplicates_kept() {
        let tokens = extract_link_tokens("[[beta]] twice: [[beta]]");
        assert_eq!(tokens, vec!["beta", "beta"]);
    }

    #[test]
    fn test_no_links() {
        assert!(extract_link_tokens("plain text, no references").is_empty());
    }
}
