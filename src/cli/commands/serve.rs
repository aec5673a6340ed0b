//! Serve command - keep every index in sync until interrupted

use crate::core::services::Services;
use clap::Args;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Exit once the initial crawl of every index has finished
    #[arg(long)]
    pub once: bool,
}

/// Execute the serve command
pub async fn execute(
    args: ServeArgs,
    services: &Services,
) -> Result<(), Box<dyn std::error::Error>> {
    services.config.log_config();

    services.wait_until_crawled().await;
    for name in services.index_names() {
        let store = services.store(&name)?;
        tracing::info!("Index '{}' ready with {} page(s)", name, store.num_docs()?);
    }

    if args.once {
        return Ok(());
    }

    tracing::info!("Watching for changes, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}
