//! Subcommand implementations.

pub mod links;
pub mod reindex;
pub mod search;
pub mod suggest;

use std::path::{Path, PathBuf};

use notedex_core::config::EngineConfig;

/// Load configuration and apply the `--data-dir` override.
pub fn load_config(config: Option<&Path>, data_dir: Option<PathBuf>) -> EngineConfig {
    let mut cfg = match EngineConfig::load(config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    if data_dir.is_some() {
        cfg.data_dir = data_dir;
    }
    cfg
}

/// Canonical vault id for a vault directory.
pub fn vault_id(root: &Path) -> String {
    match root.canonicalize() {
        Ok(p) => p.display().to_string(),
        Err(e) => {
            eprintln!("Vault directory not found: {}: {}", root.display(), e);
            std::process::exit(1);
        }
    }
}

/// Unwrap an engine response or exit with its error message.
pub fn unwrap_or_exit<T>(result: Result<T, String>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{context}: {e}");
            std::process::exit(1);
        }
    }
}

/// Character-safe truncation for table cells.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
