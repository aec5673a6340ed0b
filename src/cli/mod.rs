//! CLI adapter for Gnosis
//!
//! Provides a command-line interface over the core services: a
//! long-running `serve` mode that keeps every index in sync with its
//! directories, plus one-shot query and maintenance commands.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!                       v
//!              +------------------+
//!              |      cli/        |
//!              | (clap adapter)   |
//!              +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gnosis - wiki search indexer
///
/// Keeps full-text indexes of markdown wiki directories up to date
/// and queries them.
#[derive(Parser, Debug)]
#[command(name = "gnosis")]
#[command(version)]
#[command(about = "Markdown wiki search indexer", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Configuration file (overrides GNOSIS_CONFIG and the XDG lookup)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index every configured directory and watch for changes
    Serve(commands::ServeArgs),

    /// Search with query-string syntax over titles and bodies
    #[command(name = "query-search")]
    QuerySearch(commands::QueryArgs),

    /// Typo-tolerant search, optionally filtered by topic and author
    #[command(name = "fuzzy-search")]
    FuzzySearch(commands::FuzzyArgs),

    /// List the distinct values of a field
    #[command(name = "list-field")]
    ListField(commands::ListFieldArgs),

    /// List pages whose field matches a value
    #[command(name = "list-field-values")]
    ListFieldValues(commands::ListFieldValuesArgs),

    /// Drop every page from an index
    #[command(name = "wipe-index")]
    WipeIndex(commands::WipeArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;

    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path, &xdg)?,
        None => Config::load_with_xdg(&xdg)?,
    };

    // Configuration display doesn't need open indexes
    if let Commands::ShowConfig(args) = cli.command {
        return commands::config::execute(args, &config, &xdg, cli.format);
    }

    let services = Services::open(config).await;

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, &services).await,
        Commands::QuerySearch(args) => {
            commands::search::execute_query(args, &services, cli.format).await
        }
        Commands::FuzzySearch(args) => {
            commands::search::execute_fuzzy(args, &services, cli.format).await
        }
        Commands::ListField(args) => {
            commands::field::execute_list(args, &services, cli.format).await
        }
        Commands::ListFieldValues(args) => {
            commands::field::execute_values(args, &services, cli.format).await
        }
        Commands::WipeIndex(args) => commands::wipe::execute(args, &services, cli.format).await,
        Commands::ShowConfig(_) => Ok(()),
    };

    services.close().await?;
    result
}
