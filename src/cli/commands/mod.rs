//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for a specific CLI command.

pub mod config;
pub mod field;
pub mod search;
pub mod serve;
pub mod wipe;

// Re-export argument types for use in mod.rs
pub use config::ConfigArgs;
pub use field::{ListFieldArgs, ListFieldValuesArgs};
pub use search::{FuzzyArgs, QueryArgs};
pub use serve::ServeArgs;
pub use wipe::WipeArgs;
