//! Reindex command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use notedex_core::engine::{Operation, Response};
use notedex_core::index::RebuildStats;

use super::{load_config, unwrap_or_exit, vault_id};
use crate::client::EngineClient;
use crate::{ReindexArgs, notes};

pub async fn run(config: Option<&Path>, data_dir: Option<PathBuf>, args: ReindexArgs) {
    let cfg = load_config(config, data_dir);
    let vault = vault_id(&args.vault);

    let documents = match notes::collect_documents(&args.vault) {
        Ok(docs) => docs,
        Err(e) => {
            eprintln!("Error reading vault: {}", e);
            std::process::exit(1);
        }
    };

    println!("Indexing vault: {}", args.vault.display());

    let mut client = EngineClient::spawn(cfg);
    let payload = client
        .call_with(&vault, Operation::RebuildIndex { documents }, |event| match event {
            Response::Ready { backend, .. } => {
                println!("Storage backend: {}", backend);
            }
            Response::Progress { indexed, total, .. } => {
                print!("\rIndexing... {}/{}", indexed, total);
                std::io::stdout().flush().ok();
            }
            _ => {}
        })
        .await;
    let payload = unwrap_or_exit(payload, "Error during indexing");
    println!();

    let stats: RebuildStats = match serde_json::from_value(payload) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Unexpected rebuild payload: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("Indexing complete:");
    println!("  Notes indexed:  {}", stats.notes);
    println!("  Links indexed:  {}", stats.edges);
    println!("  Duration:       {}ms", stats.duration_ms);
}
