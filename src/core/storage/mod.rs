//! Storage layer for Tantivy-based page indexing.
//!
//! # Architecture
//!
//! - **PageIndex**: Wraps Tantivy index operations
//! - **IndexStore**: Lock, lifecycle and watchers around one PageIndex
//!
//! # Index Directory Structure
//!
//! ```text
//! {data_dir}/indexes/
//! ├── {index-name-1}/
//! │   ├── .managed.json
//! │   ├── meta.json
//! │   └── [segment files]
//! ```

mod store;
mod tantivy;

pub use self::tantivy::{create_schema, PageIndex, RawHit, RawResults, RawValue};
pub use store::{IndexStore, Lifecycle};
