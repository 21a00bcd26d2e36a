mod client;
mod cmd;
mod logging;
mod notes;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ndx", version, about = "Vault indexing, search, and link graph")]
struct Cli {
    /// Path to a config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the directory vault databases are stored in
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild a vault's index from its markdown files
    Reindex(ReindexArgs),

    /// Ranked full-text search over a vault
    Search(SearchArgs),

    /// Typeahead suggestions for a partial query
    Suggest(SuggestArgs),

    /// Outlinks and backlinks for one note
    Links(LinksArgs),
}

#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// Vault root directory
    pub vault: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Vault root directory
    pub vault: PathBuf,

    /// Query terms (all must match)
    pub query: String,

    /// Match against titles only
    #[arg(long)]
    pub title: bool,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<f64>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Vault root directory
    pub vault: PathBuf,

    /// Partial query; the last term is treated as a prefix
    pub query: String,

    /// Maximum number of suggestions
    #[arg(long)]
    pub limit: Option<f64>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LinksArgs {
    /// Vault root directory
    pub vault: PathBuf,

    /// Note path relative to the vault root (e.g. docs/alpha.md)
    pub note: String,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reindex(args) => {
            cmd::reindex::run(cli.config.as_deref(), cli.data_dir, args).await
        }
        Commands::Search(args) => {
            cmd::search::run(cli.config.as_deref(), cli.data_dir, args).await
        }
        Commands::Suggest(args) => {
            cmd::suggest::run(cli.config.as_deref(), cli.data_dir, args).await
        }
        Commands::Links(args) => {
            cmd::links::run(cli.config.as_deref(), cli.data_dir, args).await
        }
    }

    Ok(())
}
