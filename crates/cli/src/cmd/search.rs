//! Search command implementation.

use std::path::{Path, PathBuf};

use notedex_core::engine::{Operation, SearchQuery};
use notedex_core::index::{SearchHit, SearchScope};

use super::{load_config, truncate, unwrap_or_exit, vault_id};
use crate::SearchArgs;
use crate::client::EngineClient;

pub async fn run(config: Option<&Path>, data_dir: Option<PathBuf>, args: SearchArgs) {
    let cfg = load_config(config, data_dir);
    let vault = vault_id(&args.vault);

    let scope = if args.title { SearchScope::Title } else { SearchScope::Full };

    let mut client = EngineClient::spawn(cfg);
    let payload = client
        .call(
            &vault,
            Operation::Search {
                query: SearchQuery { text: args.query, scope, limit: args.limit },
            },
        )
        .await;
    let payload = unwrap_or_exit(payload, "Error searching");

    let hits: Vec<SearchHit> = match serde_json::from_value(payload) {
        Ok(hits) => hits,
        Err(e) => {
            eprintln!("Unexpected search payload: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits).unwrap_or_default());
        return;
    }

    print_hits_table(&hits);
}

/// Print search results as a table.
fn print_hits_table(hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("(no results found)");
        return;
    }

    let path_width =
        hits.iter().map(|h| h.note.path.len()).max().unwrap_or(4).clamp(4, 40);
    let title_width =
        hits.iter().map(|h| h.note.title.len()).max().unwrap_or(5).clamp(5, 30);

    println!(
        "{:<path_width$}  {:<title_width$}  SCORE",
        "PATH",
        "TITLE",
        path_width = path_width,
        title_width = title_width,
    );
    println!(
        "{:-<path_width$}  {:-<title_width$}  {:-<5}",
        "",
        "",
        "",
        path_width = path_width,
        title_width = title_width,
    );

    for hit in hits {
        println!(
            "{:<path_width$}  {:<title_width$}  {:5.2}",
            truncate(&hit.note.path, path_width),
            truncate(&hit.note.title, title_width),
            hit.score,
            path_width = path_width,
            title_width = title_width,
        );
    }

    println!();
    println!("-- {} results --", hits.len());
}
