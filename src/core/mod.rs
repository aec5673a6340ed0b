//! Core domain logic (protocol-agnostic)
//!
//! This module contains all indexing and search logic. It is
//! independent of the HTTP front end that serves the wiki.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **indexer**: Page parsing, crawling and live watching
//! - **storage**: Tantivy index and its lifecycle
//! - **search**: Query construction, engine and response shaping
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod indexer;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{GnosisError, Result};
pub use services::Services;
