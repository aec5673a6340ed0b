//! Gnosis entry point
//!
//! Runs the wiki indexer: `gnosis serve` keeps every configured index
//! in sync with its directories, the other commands query or maintain
//! a single index.
//!
//! # Examples
//!
//! ```bash
//! # Index and watch every configured directory
//! gnosis serve --config /etc/gnosis.toml
//!
//! # Search one index
//! gnosis query-search "cache AND eviction" --index wiki
//! gnosis fuzzy-search evictoin --index wiki --topic ops
//!
//! # Facets
//! gnosis list-field topic --index wiki
//! ```

use clap::Parser;
use gnosis::cli::output::print_error;
use gnosis::cli::{run, Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // One-shot commands keep stdout for results, so log less
    let default_filter = match cli.command {
        Commands::Serve(_) => "gnosis=info",
        _ => "gnosis=warn",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
