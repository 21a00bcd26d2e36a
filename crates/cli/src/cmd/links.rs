//! Links command implementation.

use std::path::{Path, PathBuf};

use notedex_core::engine::{LinksPayload, Operation};

use super::{load_config, unwrap_or_exit, vault_id};
use crate::LinksArgs;
use crate::client::EngineClient;

pub async fn run(config: Option<&Path>, data_dir: Option<PathBuf>, args: LinksArgs) {
    let cfg = load_config(config, data_dir);
    let vault = vault_id(&args.vault);

    // Normalize the note path (strip leading ./)
    let note = args.note.strip_prefix("./").unwrap_or(&args.note).to_string();

    let mut client = EngineClient::spawn(cfg);
    let payload = client.call(&vault, Operation::Links { note_id: note }).await;
    let payload = unwrap_or_exit(payload, "Error getting links");

    let links: LinksPayload = match serde_json::from_value(payload) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("Unexpected links payload: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&links).unwrap_or_default());
        return;
    }

    println!("=== Backlinks (notes linking to {}) ===", links.path);
    if links.backlinks.is_empty() {
        println!("(none)");
    }
    for source in &links.backlinks {
        println!("{}", source);
    }

    println!();
    println!("=== Outgoing links (notes {} links to) ===", links.path);
    if links.outlinks.is_empty() {
        println!("(none)");
    }
    for target in &links.outlinks {
        println!("{}", target);
    }
}
