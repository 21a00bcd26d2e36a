//! Suggest command implementation.

use std::path::{Path, PathBuf};

use notedex_core::engine::{Operation, SuggestQuery};
use notedex_core::index::SuggestHit;

use super::{load_config, truncate, unwrap_or_exit, vault_id};
use crate::SuggestArgs;
use crate::client::EngineClient;

pub async fn run(config: Option<&Path>, data_dir: Option<PathBuf>, args: SuggestArgs) {
    let cfg = load_config(config, data_dir);
    let vault = vault_id(&args.vault);

    let mut client = EngineClient::spawn(cfg);
    let payload = client
        .call(
            &vault,
            Operation::Suggest {
                query: SuggestQuery { text: args.query, limit: args.limit },
            },
        )
        .await;
    let payload = unwrap_or_exit(payload, "Error suggesting");

    let hits: Vec<SuggestHit> = match serde_json::from_value(payload) {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("Unexpected suggest payload: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits).unwrap_or_default());
        return;
    }

    if hits.is_empty() {
        println!("(no suggestions)");
        return;
    }

    for hit in hits {
        println!("{}  ({})", hit.note.path, truncate(&hit.note.title, 40));
    }
}
