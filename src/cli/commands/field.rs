//! Field commands - facet listings over one index

use crate::cli::output::{print_response, print_values};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;

/// Arguments for the list-field command
#[derive(Args, Debug)]
pub struct ListFieldArgs {
    /// Field name (topic, keyword, author, path, ...)
    pub field: String,

    /// Index to list
    #[arg(long, short = 'i')]
    pub index: String,
}

/// Arguments for the list-field-values command
#[derive(Args, Debug)]
pub struct ListFieldValuesArgs {
    /// Field name
    pub field: String,

    /// Value to match (exact on topic/keyword/author/path)
    pub value: String,

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

/// Execute the list-field command
pub async fn execute_list(
    args: ListFieldArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = services.engine(&args.index)?;
    engine.store().wait_until_crawled().await;

    let values = engine.list_field(&args.field)?;
    print_values(&values, format)?;
    Ok(())
}

/// Execute the list-field-values command
pub async fn execute_values(
    args: ListFieldValuesArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = services.engine(&args.index)?;
    engine.store().wait_until_crawled().await;

    let response =
        engine.list_field_values(&args.field, &args.value, args.page_size, args.page)?;
    print_response(&response, format)?;
    Ok(())
}
