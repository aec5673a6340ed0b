//! Search commands - query-string and fuzzy search over one index

use crate::cli::output::print_response;
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;

/// Arguments for the query-search command
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Search query (supports AND/OR/NOT, phrases and field:value)
    pub query: String,

    /// Index to search
    #[arg(long, short = 'i')]
    pub index: String,

    /// Zero-based result page
    #[arg(long, default_value = "0")]
    pub page: usize,

    /// Results per page (0 uses the configured default)
    #[arg(long, short = 'n', default_value = "0")]
    pub page_size: usize,
}

/// Arguments for the fuzzy-search command
#[derive(Args, Debug)]
pub struct FuzzyArgs {
    /// Words to match approximately (empty matches every page)
    #[arg(default_value = "")]
    pub term: String,

    /// Index to search
    #[arg(long, short = 'i')]
    pub index: String,

    /// Only pages with one of these topics (repeatable)
    #[arg(long, short = 't')]
    pub topic: Vec<String>,

    /// Only pages by one of these authors (repeatable)
    #[arg(long, short = 'a')]
    pub author: Vec<String>,

    /// Zero-based result page
    #[arg(long, default_value = "0")]
    pub page: usize,

    /// Results per page (0 uses the configured default)
    #[arg(long, short = 'n', default_value = "0")]
    pub page_size: usize,
}

/// Execute the query-search command
pub async fn execute_query(
    args: QueryArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = services.engine(&args.index)?;
    engine.store().wait_until_crawled().await;

    let response = engine.query_search(&args.query, args.page, args.page_size)?;
    print_response(&response, format)?;
    Ok(())
}

/// Execute the fuzzy-search command
pub async fn execute_fuzzy(
    args: FuzzyArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = services.engine(&args.index)?;
    engine.store().wait_until_crawled().await;

    let response = engine.fuzzy_search(
        &args.term,
        &args.topic,
        &args.author,
        args.page,
        args.page_size,
    )?;
    print_response(&response, format)?;
    Ok(())
}
