//! Output formatting for CLI commands
//!
//! Provides utilities for formatting command output in human-readable
//! or JSON formats. Supports colored output (respects NO_COLOR env var).

use crate::cli::OutputFormat;
use crate::core::types::SearchResponse;
use std::time::Duration;

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for index names
    pub fn index_name(s: &str) -> ColoredString {
        s.cyan()
    }

    /// Style for URI paths
    pub fn uri_path(s: &str) -> ColoredString {
        s.blue()
    }

    /// Style for success messages
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Style for warning messages
    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Style for dim/secondary text
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    /// Style for search scores
    pub fn score(s: &str) -> ColoredString {
        s.magenta()
    }

    /// Style for rank numbers
    pub fn rank(s: &str) -> ColoredString {
        s.green().bold()
    }
}

/// Format duration into human-readable string
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs - (mins * 60.0);
        format!("{mins:.0}m {remaining_secs:.1}s")
    } else if secs >= 1.0 {
        format!("{secs:.2}s")
    } else {
        let ms = secs * 1000.0;
        format!("{ms:.0}ms")
    }
}

/// One-line summary of a page of results
pub fn summary_line(response: &SearchResponse) -> String {
    if response.total_hits == 0 {
        return "No results".to_string();
    }

    let first = response.page_offset + 1;
    let last = response.page_offset + response.results.len();
    if response.results.is_empty() {
        format!(
            "{} result(s), none on this page ({})",
            response.total_hits,
            format_duration(response.search_time)
        )
    } else {
        format!(
            "Results {first}-{last} of {} ({})",
            response.total_hits,
            format_duration(response.search_time)
        )
    }
}

/// Print a search response in the requested format
pub fn print_response(
    response: &SearchResponse,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            println!("{}", colors::label(&summary_line(response)));

            for (i, hit) in response.results.iter().enumerate() {
                let rank = response.page_offset + i + 1;
                println!(
                    "\n[{}] {} {}",
                    colors::rank(&rank.to_string()),
                    colors::label(&hit.title),
                    colors::score(&format!("({:.0}%)", hit.score))
                );
                println!("    {}", colors::uri_path(&hit.uri_path));
                if !hit.topics.is_empty() {
                    println!("    topics: {}", colors::dim(&hit.topics.join(", ")));
                }
                if !hit.authors.is_empty() {
                    println!("    authors: {}", colors::dim(&hit.authors.join(", ")));
                }
                if let Some(body) = &hit.body {
                    for line in body.lines().filter(|l| !l.trim().is_empty()) {
                        println!("    {}", colors::dim(line));
                    }
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
    }
    Ok(())
}

/// Print a list of values in the requested format
pub fn print_values(values: &[String], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Human => {
            for value in values {
                println!("{value}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(values)?);
        }
    }
    Ok(())
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", colors::warning("Warning"), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}: {}", colors::error("Error"), message);
}
