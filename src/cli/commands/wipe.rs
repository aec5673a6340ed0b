//! Wipe command - drop every page from an index

use crate::cli::output::{colors, print_warning};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use std::io::{self, Write};

/// Arguments for the wipe-index command
#[derive(Args, Debug)]
pub struct WipeArgs {
    /// Index to wipe
    #[arg(long, short = 'i')]
    pub index: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'f')]
    pub force: bool,
}

/// Execute the wipe-index command
pub async fn execute(
    args: WipeArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = services.store(&args.index)?;

    // Confirmation prompt unless --force
    if !args.force {
        print!(
            "Wipe every page from index '{}'? [y/N] ",
            colors::index_name(&args.index)
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", colors::dim("Cancelled."));
            return Ok(());
        }
    }

    // Let the startup crawl finish so it doesn't refill the new index
    store.wait_until_crawled().await;
    store.wipe()?;

    match format {
        OutputFormat::Human => {
            println!(
                "{} index '{}'",
                colors::success("Wiped"),
                colors::index_name(&args.index)
            );
            print_warning("pages come back on the next crawl of the watched directories");
        }
        OutputFormat::Json => {
            let response = serde_json::json!({
                "wiped": true,
                "index": args.index
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
