//! Config command - show current configuration

use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::xdg::XdgDirs;
use clap::Args;
use serde::Serialize;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse<'a> {
    pub config_file: String,
    pub data_dir: String,
    #[serde(flatten)]
    pub config: &'a Config,
}

/// Execute the config command
pub fn execute(
    _args: ConfigArgs,
    config: &Config,
    xdg: &XdgDirs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = ConfigResponse {
        config_file: xdg.config_file().to_string_lossy().into_owned(),
        data_dir: xdg.data_dir.to_string_lossy().into_owned(),
        config,
    };

    match format {
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  config_file: {}", response.config_file);
            println!("  data_dir: {}", response.data_dir);
            println!("  server:");
            println!("    host: {}", config.server.host);
            println!("    port: {}", config.server.port);
            println!("  search:");
            println!("    default_page_size: {}", config.search.default_page_size);
            println!("    max_page_size: {}", config.search.max_page_size);
            println!("    body_preview_chars: {}", config.search.body_preview_chars);
            println!("    fuzzy_distance: {}", config.search.fuzzy_distance);
            for section in &config.indexes {
                println!("  index '{}':", section.name);
                println!("    index_path: {}", section.index_path.display());
                println!("    index_type: {}", section.index_type);
                println!("    watch_extension: {}", section.watch_extension);
                println!("    debounce_ms: {}", section.debounce_ms);
                println!("    restricted: {:?}", section.restricted);
                for (root, prefix) in &section.watch_dirs {
                    println!("    watch: {root} -> {prefix}");
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
